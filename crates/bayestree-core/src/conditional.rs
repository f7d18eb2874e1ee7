//! # Conditional Capability
//!
//! The narrow interface the tree needs from a conditional distribution,
//! and the `BayesNet` container of conditionals in elimination order.
//!
//! The tree, clique and shortcut algorithms are written once against
//! `Conditional`; symbolic, discrete and Gaussian conditionals implement it.

use crate::types::{BayesTreeError, Key};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// CONDITIONAL TRAIT
// =============================================================================

/// A conditional distribution `P(frontals | parents)`.
///
/// Frontal and parent keys are disjoint; frontal order is significant.
pub trait Conditional: Clone + fmt::Debug {
    /// Keys the conditional is a distribution over, in order.
    fn frontals(&self) -> &[Key];

    /// Keys the conditional is conditioned on, in order.
    fn parents(&self) -> &[Key];

    /// Product with another conditional.
    ///
    /// Frontal sets must be disjoint (`DegenerateCombination` otherwise);
    /// parents may overlap. The frontals of the result are `self`'s frontals
    /// followed by `other`'s, and its parents are the union of both parent
    /// lists minus those frontals. Cycles are not checked.
    fn combine(&self, other: &Self) -> Result<Self, BayesTreeError>;

    /// Marginalize out the given frontal keys.
    ///
    /// Keys outside the scope are ignored. Eliminating a parent, or every
    /// frontal, is an `InvalidElimination`.
    fn eliminate(&self, keys: &BTreeSet<Key>) -> Result<Self, BayesTreeError>;

    /// Structural and numeric equality within `tol`.
    fn equals(&self, other: &Self, tol: f64) -> bool;

    /// All keys: frontals first, then parents.
    fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.frontals()
            .iter()
            .chain(self.parents().iter())
            .copied()
    }
}

/// Frontal and parent lists of the product of two conditionals.
///
/// Shared by every `Conditional` implementation so that all of them agree
/// on key order.
pub fn combined_structure(
    frontals_a: &[Key],
    parents_a: &[Key],
    frontals_b: &[Key],
    parents_b: &[Key],
) -> Result<(Vec<Key>, Vec<Key>), BayesTreeError> {
    if let Some(&key) = frontals_b.iter().find(|k| frontals_a.contains(k)) {
        return Err(BayesTreeError::DegenerateCombination(key));
    }

    let frontals: Vec<Key> = frontals_a.iter().chain(frontals_b).copied().collect();
    let mut parents = Vec::new();
    for &key in parents_a.iter().chain(parents_b) {
        if !frontals.contains(&key) && !parents.contains(&key) {
            parents.push(key);
        }
    }
    Ok((frontals, parents))
}

/// Validate an elimination request and return the surviving frontals.
pub fn surviving_frontals(
    frontals: &[Key],
    parents: &[Key],
    keys: &BTreeSet<Key>,
) -> Result<Vec<Key>, BayesTreeError> {
    if let Some(&key) = parents.iter().find(|k| keys.contains(k)) {
        return Err(BayesTreeError::InvalidElimination {
            key,
            reason: "parent variables cannot be marginalized".to_string(),
        });
    }

    let remaining: Vec<Key> = frontals
        .iter()
        .filter(|k| !keys.contains(k))
        .copied()
        .collect();

    match (remaining.is_empty(), frontals.first()) {
        (true, Some(&key)) => Err(BayesTreeError::InvalidElimination {
            key,
            reason: "at least one frontal variable must remain".to_string(),
        }),
        _ => Ok(remaining),
    }
}

/// Combine a sequence of conditionals front to back.
///
/// Returns `None` for an empty sequence.
pub fn combine_all<'a, C, I>(conditionals: I) -> Result<Option<C>, BayesTreeError>
where
    C: Conditional + 'a,
    I: IntoIterator<Item = &'a C>,
{
    let mut joint: Option<C> = None;
    for conditional in conditionals {
        joint = Some(match joint {
            Some(acc) => acc.combine(conditional)?,
            None => conditional.clone(),
        });
    }
    Ok(joint)
}

// =============================================================================
// BAYES NET
// =============================================================================

/// An ordered sequence of conditionals.
///
/// In elimination order, each conditional's parents appear later in the
/// sequence than the conditional itself.
#[derive(Debug, Clone)]
pub struct BayesNet<C> {
    conditionals: Vec<C>,
}

impl<C> Default for BayesNet<C> {
    fn default() -> Self {
        Self {
            conditionals: Vec::new(),
        }
    }
}

impl<C: Conditional> BayesNet<C> {
    /// Create an empty Bayes net.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a conditional at the end (eliminated last so far).
    pub fn push_back(&mut self, conditional: C) {
        self.conditionals.push(conditional);
    }

    /// Prepend a conditional (eliminated first).
    pub fn push_front(&mut self, conditional: C) {
        self.conditionals.insert(0, conditional);
    }

    /// Number of conditionals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditionals.len()
    }

    /// Check if the net has no conditionals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditionals.is_empty()
    }

    /// First conditional in elimination order.
    #[must_use]
    pub fn front(&self) -> Option<&C> {
        self.conditionals.first()
    }

    /// Last conditional in elimination order (closest to the root).
    #[must_use]
    pub fn back(&self) -> Option<&C> {
        self.conditionals.last()
    }

    /// Iterate in elimination order.
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.conditionals.iter()
    }

    /// Conditionals as a slice, in elimination order.
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.conditionals
    }

    /// Distinct frontal keys, in elimination order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        let mut seen = BTreeSet::new();
        self.conditionals
            .iter()
            .flat_map(|c| c.frontals().iter().copied())
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// Order-sensitive equality: same length and pairwise-equal conditionals.
    #[must_use]
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        self.len() == other.len()
            && self
                .conditionals
                .iter()
                .zip(&other.conditionals)
                .all(|(a, b)| a.equals(b, tol))
    }
}

impl<C> FromIterator<C> for BayesNet<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            conditionals: iter.into_iter().collect(),
        }
    }
}

impl<C> IntoIterator for BayesNet<C> {
    type Item = C;
    type IntoIter = std::vec::IntoIter<C>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.into_iter()
    }
}

impl<'a, C> IntoIterator for &'a BayesNet<C> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditionals.iter()
    }
}

// =============================================================================
// TESTS
// =============================================================================
