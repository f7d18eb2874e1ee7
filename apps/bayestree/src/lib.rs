//! # bayestree
//!
//! Command-line front end for `bayestree-core`: loads a discrete model
//! from TOML, eliminates it, builds the Bayes tree and answers queries.
//!
//! This is the only I/O-aware component; the engine stays pure.

pub mod cli;
pub mod error;
pub mod model;
pub mod report;

pub use error::AppError;
pub use model::Model;
