//! # bayestree-core
//!
//! The Bayes tree engine - THE LOGIC.
//!
//! A Bayes tree regroups a chordal Bayes net (conditionals in elimination
//! order) into cliques, so that marginals and joints can be read off by
//! walking from a clique to the root instead of touching the whole net.
//!
//! ## Layout
//!
//! - `conditional`: the `Conditional` capability and the `BayesNet` container
//! - `symbolic` / `discrete` / `gaussian`: conditional families
//! - `clique` / `tree`: the clique arena, insertion and queries
//!
//! ## Architectural Constraints
//!
//! - Pure, synchronous Rust: no I/O, no async, no global state
//! - Deterministic: ordered maps everywhere, results never depend on hashing
//! - A failed insertion leaves the tree unchanged

// =============================================================================
// MODULES
// =============================================================================

pub mod clique;
pub mod conditional;
pub mod discrete;
pub mod gaussian;
pub mod primitives;
pub mod symbolic;
pub mod tree;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{BayesTreeError, DiscreteKey, Key};

// =============================================================================
// RE-EXPORTS: Conditionals
// =============================================================================

pub use conditional::{BayesNet, Conditional};
pub use discrete::{Assignment, DiscreteFactorGraph, TableConditional, TableFactor};
pub use gaussian::{GaussianConditional, GaussianFactor, GaussianFactorGraph};
pub use symbolic::SymbolicConditional;

// =============================================================================
// RE-EXPORTS: Tree
// =============================================================================

pub use clique::{Clique, CliqueId};
pub use primitives::{DEFAULT_TOLERANCE, MAX_TREE_DEPTH};
pub use tree::BayesTree;
