//! # Gaussian Conditionals
//!
//! Linear-Gaussian densities over vector-valued variables, kept in
//! information form so that products are sums and marginalization is a
//! Schur complement.

pub mod conditional;
pub mod graph;
mod information;
mod linalg;

pub use conditional::GaussianConditional;
pub use graph::{GaussianFactor, GaussianFactorGraph};
