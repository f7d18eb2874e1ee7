//! # Cliques
//!
//! A clique groups the conditionals that share one separator. Cliques live
//! in the tree's arena and refer to each other by `CliqueId`: the parent
//! owns its children through the arena, the parent handle is structural
//! metadata only.

use crate::conditional::{BayesNet, Conditional, combine_all};
use crate::types::{BayesTreeError, Key};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// Handle to a clique inside a `BayesTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CliqueId(pub usize);

impl fmt::Display for CliqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A node of the Bayes tree.
///
/// `conditionals` are kept in elimination order: the most recently
/// inserted conditional is eliminated first and sits at the front.
#[derive(Debug, Clone)]
pub struct Clique<C> {
    id: CliqueId,
    conditionals: Vec<C>,
    frontals: Vec<Key>,
    separator: Vec<Key>,
    parent: Option<CliqueId>,
    children: Vec<CliqueId>,
    /// Edges to the root, fixed at creation.
    depth: usize,
    /// `P(separator \ root frontals | root frontals)`, filled on first query.
    shortcut: OnceLock<Vec<C>>,
}

impl<C: Conditional> Clique<C> {
    /// Create a clique holding a single conditional.
    ///
    /// The separator is the conditional's parent list and never changes.
    pub(crate) fn new(
        id: CliqueId,
        conditional: C,
        parent: Option<CliqueId>,
        depth: usize,
    ) -> Self {
        Self {
            id,
            frontals: conditional.frontals().to_vec(),
            separator: conditional.parents().to_vec(),
            conditionals: vec![conditional],
            parent,
            children: Vec::new(),
            depth,
            shortcut: OnceLock::new(),
        }
    }

    /// Prepend a conditional whose parents are exactly this clique's scope.
    pub(crate) fn push_front(&mut self, conditional: C) {
        let mut frontals = conditional.frontals().to_vec();
        frontals.extend_from_slice(&self.frontals);
        self.frontals = frontals;
        self.conditionals.insert(0, conditional);
    }

    pub(crate) fn add_child(&mut self, child: CliqueId) {
        self.children.push(child);
    }

    /// Handle of this clique.
    #[must_use]
    pub fn id(&self) -> CliqueId {
        self.id
    }

    /// Number of frontal variables.
    #[must_use]
    pub fn size(&self) -> usize {
        self.frontals.len()
    }

    /// Frontal keys in elimination order.
    #[must_use]
    pub fn frontals(&self) -> &[Key] {
        &self.frontals
    }

    /// Keys shared with the parent clique. Empty for roots.
    #[must_use]
    pub fn separator(&self) -> &[Key] {
        &self.separator
    }

    /// Conditionals in elimination order.
    #[must_use]
    pub fn conditionals(&self) -> &[C] {
        &self.conditionals
    }

    /// Parent clique, `None` for roots.
    #[must_use]
    pub fn parent(&self) -> Option<CliqueId> {
        self.parent
    }

    /// Child cliques in creation order.
    #[must_use]
    pub fn children(&self) -> &[CliqueId] {
        &self.children
    }

    /// Number of edges between this clique and its root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Check if this clique is a root (no separator, no parent).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Frontal keys as a set.
    #[must_use]
    pub fn frontal_set(&self) -> BTreeSet<Key> {
        self.frontals.iter().copied().collect()
    }

    /// Separator keys as a set.
    #[must_use]
    pub fn separator_set(&self) -> BTreeSet<Key> {
        self.separator.iter().copied().collect()
    }

    /// Every key the clique mentions: frontals and separator.
    #[must_use]
    pub fn scope(&self) -> BTreeSet<Key> {
        self.frontals
            .iter()
            .chain(self.separator.iter())
            .copied()
            .collect()
    }

    /// The clique's conditionals as a Bayes net.
    #[must_use]
    pub fn as_bayes_net(&self) -> BayesNet<C> {
        self.conditionals.iter().cloned().collect()
    }

    /// Memoized shortcut, if it was already computed.
    #[must_use]
    pub fn cached_shortcut(&self) -> Option<&[C]> {
        self.shortcut.get().map(Vec::as_slice)
    }

    /// Store a computed shortcut.
    ///
    /// The first write wins; later writes of the same value are dropped.
    pub(crate) fn store_shortcut(&self, shortcut: Vec<C>) {
        if self.shortcut.set(shortcut).is_err() {
            tracing::trace!(clique = %self.id, "shortcut already cached");
        }
    }

    /// Compute this clique's shortcut from its parent's.
    ///
    /// When the parent is a root the separator lies inside the root's
    /// frontals and the shortcut is empty. Otherwise the parent's
    /// conditionals are combined with the parent's shortcut, giving the
    /// parent's frontals and separator given the root, and every frontal
    /// that is not in this clique's separator is eliminated.
    pub(crate) fn shortcut_from_parent(
        &self,
        parent: &Clique<C>,
        parent_shortcut: &[C],
    ) -> Result<Vec<C>, BayesTreeError> {
        if parent.is_root() {
            return Ok(Vec::new());
        }

        let Some(joint) = combine_all(parent.conditionals.iter().chain(parent_shortcut))? else {
            return Ok(Vec::new());
        };

        let separator = self.separator_set();
        let eliminate: BTreeSet<Key> = joint
            .frontals()
            .iter()
            .filter(|k| !separator.contains(k))
            .copied()
            .collect();

        tracing::trace!(
            clique = %self.id,
            parent = %parent.id,
            eliminated = eliminate.len(),
            "computing shortcut"
        );

        Ok(vec![joint.eliminate(&eliminate)?])
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::SymbolicConditional;

    fn k(c: char) -> Key {
        Key::symbol(c, 0)
    }

    #[test]
    fn push_front_extends_frontals_and_keeps_separator() {
        let mut clique = Clique::new(
            CliqueId(0),
            SymbolicConditional::new(k('x'), &[k('y')]),
            Some(CliqueId(1)),
            1,
        );
        clique.push_front(SymbolicConditional::new(k('w'), &[k('x'), k('y')]));

        assert_eq!(clique.frontals(), &[k('w'), k('x')]);
        assert_eq!(clique.separator(), &[k('y')]);
        assert_eq!(clique.size(), 2);
        assert_eq!(clique.conditionals().len(), 2);
        assert_eq!(
            clique.scope(),
            [k('w'), k('x'), k('y')].into_iter().collect()
        );
    }

    #[test]
    fn shortcut_is_stored_once() {
        let clique = Clique::new(CliqueId(3), SymbolicConditional::new(k('a'), &[]), None, 0);
        assert!(clique.cached_shortcut().is_none());

        clique.store_shortcut(Vec::new());
        clique.store_shortcut(vec![SymbolicConditional::new(k('z'), &[])]);

        assert_eq!(clique.cached_shortcut().map(<[_]>::len), Some(0));
    }

    #[test]
    fn shortcut_under_root_child_is_empty() {
        let root = Clique::new(CliqueId(0), SymbolicConditional::new(k('r'), &[]), None, 0);
        let child = Clique::new(
            CliqueId(1),
            SymbolicConditional::new(k('c'), &[k('r')]),
            Some(CliqueId(0)),
            1,
        );
        let shortcut = child.shortcut_from_parent(&root, &[]).expect("shortcut");
        assert!(shortcut.is_empty());
    }

    #[test]
    fn clique_id_display() {
        assert_eq!(CliqueId(4).to_string(), "C4");
    }
}
