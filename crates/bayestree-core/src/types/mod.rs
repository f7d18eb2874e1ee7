//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the engine:
//! - Variable identifiers (`Key`, `DiscreteKey`)
//! - Error types (`BayesTreeError`)
//!
//! ## Determinism Guarantees
//!
//! All identifiers in this module:
//! - Are plain integers (`Copy`, no allocation)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// KEYS
// =============================================================================

/// Number of low bits that hold the index part of a symbol key.
const INDEX_BITS: u32 = 56;

/// Mask selecting the index part of a symbol key.
const INDEX_MASK: u64 = (1 << INDEX_BITS) - 1;

/// Unique identifier for a variable.
///
/// Keys are opaque integers. `Key::symbol` packs a character and an index
/// into one key (character in the top byte), which is how robotics-style
/// variables such as `x1`, `l3` are usually named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(pub u64);

impl Key {
    /// Create a key from a raw integer.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Create a symbol key such as `x7` from a character and an index.
    ///
    /// Only the low byte of `c` and the low 56 bits of `index` are kept.
    #[must_use]
    pub const fn symbol(c: char, index: u64) -> Self {
        Self(((c as u64 & 0xff) << INDEX_BITS) | (index & INDEX_MASK))
    }

    /// Character part of a symbol key (`'\0'` for plain keys).
    #[must_use]
    pub const fn chr(self) -> char {
        (self.0 >> INDEX_BITS) as u8 as char
    }

    /// Index part of a symbol key.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.0 & INDEX_MASK
    }

    /// Get the raw key value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Key {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.chr();
        if c.is_ascii_alphabetic() {
            write!(f, "{}{}", c, self.index())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A discrete variable: its key together with the number of values it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiscreteKey {
    /// The variable.
    pub key: Key,
    /// Number of values the variable can take (at least 1).
    pub cardinality: usize,
}

impl DiscreteKey {
    /// Create a new discrete key.
    #[must_use]
    pub const fn new(key: Key, cardinality: usize) -> Self {
        Self { key, cardinality }
    }
}

/// Render a key list as `a, b, c` for error messages and logs.
pub(crate) fn format_keys(keys: &[Key]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building or querying a Bayes tree.
///
/// - No silent failures
/// - Use `Result<T, BayesTreeError>` for fallible operations
/// - A failed insertion leaves the tree exactly as it was
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesTreeError {
    /// The requested key is not a frontal of any clique.
    #[error("Key not found: {0}")]
    KeyNotFound(Key),

    /// A parent of the inserted conditional is not yet in the tree.
    #[error("Structure error: parent {parent} of {key} is not in the tree")]
    MissingParent { key: Key, parent: Key },

    /// The parents of the inserted conditional do not live in one clique.
    #[error("Structure error: parents [{parents}] of {key} span more than one clique")]
    NonChordal { key: Key, parents: String },

    /// The key is already a frontal variable of some clique.
    #[error("Structure error: {0} is already a frontal variable")]
    DuplicateFrontal(Key),

    /// Two conditionals being combined share a frontal variable.
    #[error("Degenerate combination: {0} is frontal in both conditionals")]
    DegenerateCombination(Key),

    /// An elimination request that a conditional cannot honor.
    #[error("Invalid elimination of {key}: {reason}")]
    InvalidElimination { key: Key, reason: String },

    /// A discrete table or signature is malformed.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// A Gaussian block has the wrong shape for its key.
    #[error("Dimension mismatch for {key}: expected {expected}, got {actual}")]
    DimensionMismatch {
        key: Key,
        expected: usize,
        actual: usize,
    },

    /// An information matrix that must be positive definite is not.
    #[error("Information matrix is not positive definite")]
    NotPositiveDefinite,

    /// The tree has no cliques.
    #[error("Bayes tree is empty")]
    EmptyTree,

    /// A clique handle does not belong to this tree.
    #[error("Clique not found: {0}")]
    CliqueNotFound(usize),

    /// A structural invariant of the tree does not hold.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_roundtrip() {
        let key = Key::symbol('x', 7);
        assert_eq!(key.chr(), 'x');
        assert_eq!(key.index(), 7);
        assert_eq!(key.to_string(), "x7");
    }

    #[test]
    fn plain_key_displays_raw_value() {
        assert_eq!(Key::new(42).to_string(), "42");
    }

    #[test]
    fn symbols_order_by_character_then_index() {
        let mut keys = vec![Key::symbol('x', 2), Key::symbol('l', 9), Key::symbol('x', 1)];
        keys.sort();
        assert_eq!(
            keys,
            vec![Key::symbol('l', 9), Key::symbol('x', 1), Key::symbol('x', 2)]
        );
    }

    #[test]
    fn error_messages_name_keys() {
        let err = BayesTreeError::MissingParent {
            key: Key::symbol('x', 1),
            parent: Key::symbol('x', 2),
        };
        assert_eq!(
            err.to_string(),
            "Structure error: parent x2 of x1 is not in the tree"
        );
    }

    #[test]
    fn format_keys_joins_with_commas() {
        let keys = [Key::symbol('a', 0), Key::symbol('b', 1)];
        assert_eq!(format_keys(&keys), "a0, b1");
    }
}
