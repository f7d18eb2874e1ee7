//! # Symbolic Conditionals
//!
//! Conditionals that carry only key structure. Useful for reasoning about
//! tree shape independently of any numeric representation.

use crate::conditional::{Conditional, combined_structure, surviving_frontals};
use crate::types::{BayesTreeError, Key, format_keys};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A conditional `P(frontals | parents)` without numeric content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicConditional {
    frontals: Vec<Key>,
    parents: Vec<Key>,
}

impl SymbolicConditional {
    /// Single-frontal conditional `P(key | parents)`.
    #[must_use]
    pub fn new(key: Key, parents: &[Key]) -> Self {
        Self {
            frontals: vec![key],
            parents: parents.to_vec(),
        }
    }

    /// Multi-frontal conditional.
    ///
    /// Fails if `frontals` is empty or overlaps `parents`.
    pub fn with_frontals(frontals: &[Key], parents: &[Key]) -> Result<Self, BayesTreeError> {
        if frontals.is_empty() {
            return Err(BayesTreeError::InvalidTable(
                "a conditional needs at least one frontal variable".to_string(),
            ));
        }
        if let Some(&key) = frontals.iter().find(|k| parents.contains(k)) {
            return Err(BayesTreeError::DegenerateCombination(key));
        }
        Ok(Self {
            frontals: frontals.to_vec(),
            parents: parents.to_vec(),
        })
    }
}

impl Conditional for SymbolicConditional {
    fn frontals(&self) -> &[Key] {
        &self.frontals
    }

    fn parents(&self) -> &[Key] {
        &self.parents
    }

    fn combine(&self, other: &Self) -> Result<Self, BayesTreeError> {
        let (frontals, parents) =
            combined_structure(&self.frontals, &self.parents, &other.frontals, &other.parents)?;
        Ok(Self { frontals, parents })
    }

    fn eliminate(&self, keys: &BTreeSet<Key>) -> Result<Self, BayesTreeError> {
        let frontals = surviving_frontals(&self.frontals, &self.parents, keys)?;
        Ok(Self {
            frontals,
            parents: self.parents.clone(),
        })
    }

    fn equals(&self, other: &Self, _tol: f64) -> bool {
        self == other
    }
}

impl fmt::Display for SymbolicConditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parents.is_empty() {
            write!(f, "P({})", format_keys(&self.frontals))
        } else {
            write!(
                f,
                "P({} | {})",
                format_keys(&self.frontals),
                format_keys(&self.parents)
            )
        }
    }
}
