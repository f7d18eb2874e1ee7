//! # Discrete Conditionals
//!
//! Sparse probability tables over finite-valued variables:
//! - `TableFactor`: non-negative table with product, marginalization and division
//! - `TableConditional`: `P(frontals | parents)` implementing `Conditional`
//! - `DiscreteFactorGraph`: sequential elimination into a `BayesNet`

pub mod conditional;
pub mod graph;
pub mod table;

pub use conditional::TableConditional;
pub use graph::DiscreteFactorGraph;
pub use table::{Assignment, TableFactor};
