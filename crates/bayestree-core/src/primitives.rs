//! # Engine Primitives
//!
//! Hardcoded constants for the Bayes tree engine.

/// Default tolerance for numeric equality of conditionals and trees.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Maximum depth of a root-path walk.
///
/// Well-formed trees never get close to this; a walk that exceeds it
/// signals a cyclic parent structure, which is reported as an error
/// instead of looping.
pub const MAX_TREE_DEPTH: usize = 1 << 20;

/// Probabilities at or below this value are dropped from sparse tables.
pub const SPARSE_EPSILON: f64 = 0.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tolerance_is_tight() {
        assert!(DEFAULT_TOLERANCE > 0.0);
        assert!(DEFAULT_TOLERANCE < 1e-6);
    }

    #[test]
    fn sparse_epsilon_keeps_every_positive_value() {
        assert!(SPARSE_EPSILON <= f64::MIN_POSITIVE);
    }
}
