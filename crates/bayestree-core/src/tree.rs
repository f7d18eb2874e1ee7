//! # Bayes Tree
//!
//! Construction and queries of the clique tree.
//!
//! Cliques are stored in an arena owned by the tree; `nodes` maps every
//! frontal key to the clique that owns it and `roots` lists the cliques
//! without a separator. A tree is built by inserting conditionals in
//! reverse elimination order and is read-only afterwards, apart from the
//! per-clique shortcut memo.

use crate::clique::{Clique, CliqueId};
use crate::conditional::{BayesNet, Conditional, combine_all};
use crate::primitives::MAX_TREE_DEPTH;
use crate::types::{BayesTreeError, Key, format_keys};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// BAYES TREE
// =============================================================================

/// A forest of cliques built from an eliminated Bayes net.
#[derive(Debug, Clone)]
pub struct BayesTree<C> {
    /// Clique arena, indexed by `CliqueId`.
    cliques: Vec<Clique<C>>,

    /// Frontal key -> owning clique.
    nodes: BTreeMap<Key, CliqueId>,

    /// Cliques with an empty separator, in creation order.
    roots: Vec<CliqueId>,
}

impl<C> Default for BayesTree<C> {
    fn default() -> Self {
        Self {
            cliques: Vec::new(),
            nodes: BTreeMap::new(),
            roots: Vec::new(),
        }
    }
}

/// Where an inserted conditional goes.
enum Placement {
    Root,
    Append(CliqueId),
    Child(CliqueId),
}

impl<C: Conditional> BayesTree<C> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a Bayes net in elimination order.
    ///
    /// Conditionals are inserted from the last eliminated (the root side)
    /// to the first eliminated.
    pub fn construct(bayes_net: &BayesNet<C>) -> Result<Self, BayesTreeError> {
        let mut tree = Self::new();
        for conditional in bayes_net.iter().rev() {
            tree.insert(conditional.clone())?;
        }
        tracing::debug!(
            cliques = tree.cliques.len(),
            roots = tree.roots.len(),
            variables = tree.size(),
            "constructed Bayes tree"
        );
        Ok(tree)
    }

    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Insert one conditional.
    ///
    /// Every parent must already be a frontal somewhere in the tree. The
    /// clique that receives the conditional is the deepest clique owning one
    /// of the parents; its scope (frontals and separator) must contain all of
    /// them. If the parents are exactly that scope the conditional extends
    /// the clique, otherwise it starts a new child clique. A failed insertion
    /// leaves the tree untouched.
    pub fn insert(&mut self, conditional: C) -> Result<(), BayesTreeError> {
        let placement = self.placement(&conditional)?;
        let frontals = conditional.frontals().to_vec();

        let target = match placement {
            Placement::Root => {
                let id = self.push_clique(conditional, None);
                self.roots.push(id);
                tracing::debug!(clique = %id, frontals = %format_keys(&frontals), "new root clique");
                id
            }
            Placement::Append(id) => {
                self.clique_mut(id)?.push_front(conditional);
                tracing::debug!(clique = %id, frontals = %format_keys(&frontals), "extended clique");
                id
            }
            Placement::Child(parent) => {
                let id = self.push_clique(conditional, Some(parent));
                self.clique_mut(parent)?.add_child(id);
                tracing::debug!(
                    clique = %id,
                    parent = %parent,
                    frontals = %format_keys(&frontals),
                    "new child clique"
                );
                id
            }
        };

        for key in frontals {
            self.nodes.insert(key, target);
        }
        Ok(())
    }

    /// Decide where a conditional goes without touching the tree.
    fn placement(&self, conditional: &C) -> Result<Placement, BayesTreeError> {
        let key = conditional.frontals().first().copied().unwrap_or(Key(0));

        let mut seen = BTreeSet::new();
        for &frontal in conditional.frontals() {
            if self.nodes.contains_key(&frontal) || !seen.insert(frontal) {
                return Err(BayesTreeError::DuplicateFrontal(frontal));
            }
        }

        let parents = conditional.parents();
        if parents.is_empty() {
            return Ok(Placement::Root);
        }

        let mut owners = BTreeSet::new();
        for &parent in parents {
            let owner = self
                .nodes
                .get(&parent)
                .ok_or(BayesTreeError::MissingParent { key, parent })?;
            owners.insert(*owner);
        }

        let non_chordal = || BayesTreeError::NonChordal {
            key,
            parents: format_keys(parents),
        };

        // The parent clique is the deepest owner; every other owner must be
        // one of its ancestors, which the scope check below enforces.
        let mut deepest: Vec<(usize, CliqueId)> = Vec::with_capacity(owners.len());
        for id in owners {
            deepest.push((self.clique_ref(id)?.depth(), id));
        }
        deepest.sort_unstable_by(|a, b| b.cmp(a));
        let (max_depth, candidate) = deepest[0];
        if deepest.iter().filter(|(d, _)| *d == max_depth).count() > 1 {
            return Err(non_chordal());
        }

        let scope = self.clique_ref(candidate)?.scope();
        let parent_set: BTreeSet<Key> = parents.iter().copied().collect();
        if !parent_set.is_subset(&scope) {
            return Err(non_chordal());
        }

        if parent_set == scope {
            Ok(Placement::Append(candidate))
        } else {
            Ok(Placement::Child(candidate))
        }
    }

    fn push_clique(&mut self, conditional: C, parent: Option<CliqueId>) -> CliqueId {
        let id = CliqueId(self.cliques.len());
        let depth = parent
            .and_then(|p| self.clique(p))
            .map_or(0, |p| p.depth() + 1);
        self.cliques.push(Clique::new(id, conditional, parent, depth));
        id
    }

    fn clique_mut(&mut self, id: CliqueId) -> Result<&mut Clique<C>, BayesTreeError> {
        self.cliques
            .get_mut(id.0)
            .ok_or(BayesTreeError::CliqueNotFound(id.0))
    }

    fn clique_ref(&self, id: CliqueId) -> Result<&Clique<C>, BayesTreeError> {
        self.cliques
            .get(id.0)
            .ok_or(BayesTreeError::CliqueNotFound(id.0))
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Total number of frontal variables.
    #[must_use]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no cliques.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cliques.is_empty()
    }

    /// Check if `key` is a frontal of some clique.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Clique owning `key` as a frontal.
    pub fn get(&self, key: Key) -> Result<&Clique<C>, BayesTreeError> {
        let id = self.clique_id(key)?;
        self.clique_ref(id)
    }

    /// Handle of the clique owning `key`.
    pub fn clique_id(&self, key: Key) -> Result<CliqueId, BayesTreeError> {
        self.nodes
            .get(&key)
            .copied()
            .ok_or(BayesTreeError::KeyNotFound(key))
    }

    /// Clique by handle.
    #[must_use]
    pub fn clique(&self, id: CliqueId) -> Option<&Clique<C>> {
        self.cliques.get(id.0)
    }

    /// All cliques in creation order.
    pub fn cliques(&self) -> impl Iterator<Item = &Clique<C>> {
        self.cliques.iter()
    }

    /// Number of cliques.
    #[must_use]
    pub fn clique_count(&self) -> usize {
        self.cliques.len()
    }

    /// Root cliques in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &Clique<C>> {
        self.roots.iter().filter_map(|id| self.cliques.get(id.0))
    }

    /// Conditionals of the first root clique, as a Bayes net.
    #[must_use]
    pub fn root(&self) -> Option<BayesNet<C>> {
        self.roots().next().map(Clique::as_bayes_net)
    }

    /// Cliques from `id` up to its root, `id` first.
    pub fn path_to_root(&self, id: CliqueId) -> Result<Vec<CliqueId>, BayesTreeError> {
        let mut path = vec![id];
        let mut current = self.clique_ref(id)?;
        while let Some(parent) = current.parent() {
            if path.len() > MAX_TREE_DEPTH {
                return Err(BayesTreeError::InvariantViolation(format!(
                    "root path from {} does not terminate",
                    id
                )));
            }
            path.push(parent);
            current = self.clique_ref(parent)?;
        }
        Ok(path)
    }

    /// Number of edges between a clique and its root.
    pub fn depth(&self, id: CliqueId) -> Result<usize, BayesTreeError> {
        Ok(self.clique_ref(id)?.depth())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Shortcut of a clique: its separator given the frontals of its root.
    ///
    /// Shortcuts along the root path are computed root side first, so each
    /// memo entry is written only after its parent's entry exists. Repeated
    /// calls return the cached value.
    pub fn shortcut(&self, id: CliqueId) -> Result<&[C], BayesTreeError> {
        let path = self.path_to_root(id)?;

        for &step in path.iter().rev() {
            let clique = self.clique_ref(step)?;
            if clique.cached_shortcut().is_some() {
                continue;
            }
            let shortcut = match clique.parent() {
                None => Vec::new(),
                Some(parent_id) => {
                    let parent = self.clique_ref(parent_id)?;
                    let parent_shortcut = parent.cached_shortcut().unwrap_or_default();
                    clique.shortcut_from_parent(parent, parent_shortcut)?
                }
            };
            tracing::debug!(clique = %step, size = shortcut.len(), "cached shortcut");
            clique.store_shortcut(shortcut);
        }

        Ok(self.clique_ref(id)?.cached_shortcut().unwrap_or_default())
    }

    /// Marginal distribution of a single variable.
    ///
    /// Combines the owning clique's conditionals, its shortcut and the root's
    /// conditionals into a joint over the clique, separator and root, then
    /// eliminates every frontal except `key`. The result has no parents.
    pub fn marginal(&self, key: Key) -> Result<C, BayesTreeError> {
        let id = self.clique_id(key)?;
        let path = self.path_to_root(id)?;
        let root_id = path.last().copied().unwrap_or(id);
        let root = self.clique_ref(root_id)?;

        let joint = if root_id == id {
            combine_all(root.conditionals())?
        } else {
            let clique = self.clique_ref(id)?;
            let shortcut = self.shortcut(id)?;
            combine_all(
                clique
                    .conditionals()
                    .iter()
                    .chain(shortcut)
                    .chain(root.conditionals()),
            )?
        };
        let joint = joint.ok_or(BayesTreeError::EmptyTree)?;

        let eliminate: BTreeSet<Key> = joint
            .frontals()
            .iter()
            .filter(|&&k| k != key)
            .copied()
            .collect();

        tracing::trace!(key = %key, eliminated = eliminate.len(), "marginal");
        joint.eliminate(&eliminate)
    }

    /// Joint marginal over several variables.
    ///
    /// The cliques on the root paths of all requested keys form an
    /// ancestrally closed piece of the Bayes net; their product is a joint
    /// over their frontals, from which everything but `keys` is eliminated.
    pub fn joint(&self, keys: &[Key]) -> Result<C, BayesTreeError> {
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::new();
        for &key in keys {
            for id in self.path_to_root(self.clique_id(key)?)? {
                if visited.insert(id) {
                    ordered.push(id);
                }
            }
        }

        let mut conditionals = Vec::new();
        for id in ordered {
            conditionals.extend(self.clique_ref(id)?.conditionals().iter());
        }
        let joint = combine_all(conditionals)?.ok_or(BayesTreeError::EmptyTree)?;

        let wanted: BTreeSet<Key> = keys.iter().copied().collect();
        let eliminate: BTreeSet<Key> = joint
            .frontals()
            .iter()
            .filter(|k| !wanted.contains(k))
            .copied()
            .collect();
        joint.eliminate(&eliminate)
    }

    // =========================================================================
    // COMPARISON & VALIDATION
    // =========================================================================

    /// Structural and numeric equality.
    ///
    /// Roots are compared in order. Two cliques are equal when their
    /// conditionals are pairwise equal and their children, matched by
    /// frontal and separator sets, are equal in turn. The walk uses an
    /// explicit worklist, so depth is bounded only by memory.
    #[must_use]
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        if self.roots.len() != other.roots.len() {
            return false;
        }
        let mut pending: Vec<(CliqueId, CliqueId)> =
            self.roots.iter().copied().zip(other.roots.iter().copied()).collect();

        while let Some((a, b)) = pending.pop() {
            let (Some(ca), Some(cb)) = (self.clique(a), other.clique(b)) else {
                return false;
            };
            if !Self::same_clique(ca, cb, tol) || ca.children().len() != cb.children().len() {
                return false;
            }

            let mut unmatched: Vec<&Clique<C>> = cb
                .children()
                .iter()
                .filter_map(|&child| other.clique(child))
                .collect();
            for &child_a in ca.children() {
                let Some(child) = self.clique(child_a) else {
                    return false;
                };
                let (frontals, separator) = (child.frontal_set(), child.separator_set());
                let Some(pos) = unmatched.iter().position(|c| {
                    c.frontal_set() == frontals && c.separator_set() == separator
                }) else {
                    return false;
                };
                pending.push((child_a, unmatched.swap_remove(pos).id()));
            }
        }
        true
    }

    /// Equal conditionals, frontal sets and separator sets.
    fn same_clique(a: &Clique<C>, b: &Clique<C>, tol: f64) -> bool {
        a.conditionals().len() == b.conditionals().len()
            && a
                .conditionals()
                .iter()
                .zip(b.conditionals())
                .all(|(x, y)| x.equals(y, tol))
            && a.frontal_set() == b.frontal_set()
            && a.separator_set() == b.separator_set()
    }

    /// Check the structural invariants of the tree.
    ///
    /// 1. Every key is a frontal of exactly one clique, the one `nodes` names.
    /// 2. A separator is contained in the parent's scope.
    /// 3. Parent and child links agree and every root path terminates at a
    ///    listed root.
    /// 4. Sibling cliques have disjoint frontals.
    pub fn validate(&self) -> Result<(), BayesTreeError> {
        let violation = |msg: String| Err(BayesTreeError::InvariantViolation(msg));

        let mut owner: BTreeMap<Key, CliqueId> = BTreeMap::new();
        for clique in &self.cliques {
            for &key in clique.frontals() {
                if owner.insert(key, clique.id()).is_some() {
                    return violation(format!("{} is frontal in more than one clique", key));
                }
            }
        }
        if owner != self.nodes {
            return violation("key index does not match clique frontals".to_string());
        }

        for clique in &self.cliques {
            match clique.parent() {
                None if !clique.separator().is_empty() => {
                    return violation(format!("root {} has a separator", clique.id()));
                }
                None if !self.roots.contains(&clique.id()) || clique.depth() != 0 => {
                    return violation(format!("{} is not a listed root", clique.id()));
                }
                None => {}
                Some(parent_id) => {
                    let parent = self.clique_ref(parent_id)?;
                    // Depth drops by one per step, so every root path terminates.
                    if clique.depth() != parent.depth() + 1 {
                        return violation(format!(
                            "{} records depth {} under {} at depth {}",
                            clique.id(),
                            clique.depth(),
                            parent_id,
                            parent.depth()
                        ));
                    }
                    if !parent.children().contains(&clique.id()) {
                        return violation(format!(
                            "{} is not a child of its parent {}",
                            clique.id(),
                            parent_id
                        ));
                    }
                    if !clique.separator_set().is_subset(&parent.scope()) {
                        return violation(format!(
                            "separator of {} is not contained in {}",
                            clique.id(),
                            parent_id
                        ));
                    }
                }
            }

            let mut sibling_frontals = BTreeSet::new();
            for &child in clique.children() {
                for &key in self.clique_ref(child)?.frontals() {
                    if !sibling_frontals.insert(key) {
                        return violation(format!(
                            "children of {} share frontal {}",
                            clique.id(),
                            key
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl<C: Conditional> TryFrom<&BayesNet<C>> for BayesTree<C> {
    type Error = BayesTreeError;

    fn try_from(bayes_net: &BayesNet<C>) -> Result<Self, Self::Error> {
        Self::construct(bayes_net)
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

    fn x(i: u64) -> Key {
        Key::symbol('x', i)
    }

    fn sym(key: Key, parents: &[Key]) -> SymbolicConditional {
        SymbolicConditional::new(key, parents)
    }

    /// B; L|B; E|L,B; S|L,B; T|E,L; X|E
    fn asia_tree() -> BayesTree<SymbolicConditional> {
        let mut tree = BayesTree::new();
        tree.insert(sym(k('B'), &[])).expect("B");
        tree.insert(sym(k('L'), &[k('B')])).expect("L");
        tree.insert(sym(k('E'), &[k('L'), k('B')])).expect("E");
        tree.insert(sym(k('S'), &[k('L'), k('B')])).expect("S");
        tree.insert(sym(k('T'), &[k('E'), k('L')])).expect("T");
        tree.insert(sym(k('X'), &[k('E')])).expect("X");
        tree
    }

    #[test]
    fn asia_root_clique() {
        let tree = asia_tree();
        assert_eq!(tree.size(), 6);
        assert_eq!(tree.clique_count(), 4);

        let root = tree.root().expect("root");
        let mut expected = BayesNet::new();
        expected.push_back(sym(k('E'), &[k('L'), k('B')]));
        expected.push_back(sym(k('L'), &[k('B')]));
        expected.push_back(sym(k('B'), &[]));
        assert!(root.equals(&expected, 1e-9));
    }

    #[test]
    fn asia_children_hang_off_root() {
        let tree = asia_tree();
        let root = tree.roots().next().expect("root");
        assert_eq!(root.children().len(), 3);
        for key in [k('S'), k('T'), k('X')] {
            let clique = tree.get(key).expect("clique");
            assert_eq!(clique.parent(), Some(root.id()));
            assert_eq!(clique.size(), 1);
        }
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn natural_chain_gives_one_clique_per_link() {
        // x1|x2, ..., x6|x7, x7
        let mut net = BayesNet::new();
        for i in 1..7 {
            net.push_back(sym(x(i), &[x(i + 1)]));
        }
        net.push_back(sym(x(7), &[]));

        let tree = BayesTree::construct(&net).expect("construct");
        assert_eq!(tree.size(), 7);
        assert_eq!(tree.clique_count(), 6);

        let root = tree.roots().next().expect("root");
        assert_eq!(root.frontals(), &[x(6), x(7)]);
        let c6 = tree.get(x(1)).expect("x1");
        assert_eq!(c6.separator(), &[x(2)]);
        assert_eq!(tree.depth(c6.id()).expect("depth"), 5);
    }

    #[test]
    fn nested_dissection_shape() {
        let mut net = BayesNet::new();
        net.push_back(sym(x(1), &[x(2)]));
        net.push_back(sym(x(3), &[x(2), x(4)]));
        net.push_back(sym(x(5), &[x(4), x(6)]));
        net.push_back(sym(x(7), &[x(6)]));
        net.push_back(sym(x(2), &[x(4)]));
        net.push_back(sym(x(6), &[x(4)]));
        net.push_back(sym(x(4), &[]));

        let tree = BayesTree::construct(&net).expect("construct");
        assert_eq!(tree.clique_count(), 4);

        let root = tree.roots().next().expect("root");
        assert_eq!(root.frontals(), &[x(5), x(6), x(4)]);
        assert_eq!(tree.get(x(3)).expect("x3").frontals(), &[x(3), x(2)]);
        assert_eq!(tree.get(x(1)).expect("x1").separator(), &[x(2)]);
        assert_eq!(tree.get(x(7)).expect("x7").separator(), &[x(6)]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn insert_with_missing_parent_fails_cleanly() {
        let mut tree = asia_tree();
        let before = tree.clone();

        let result = tree.insert(sym(k('Q'), &[k('Z')]));
        assert_eq!(
            result,
            Err(BayesTreeError::MissingParent {
                key: k('Q'),
                parent: k('Z'),
            })
        );
        assert!(tree.equals(&before, 1e-9));
        assert_eq!(tree.size(), 6);
    }

    #[test]
    fn insert_across_sibling_cliques_is_non_chordal() {
        let mut tree = asia_tree();
        let result = tree.insert(sym(k('Q'), &[k('S'), k('T')]));
        assert!(matches!(result, Err(BayesTreeError::NonChordal { .. })));
        assert!(!tree.contains(k('Q')));
    }

    #[test]
    fn insert_duplicate_frontal_fails() {
        let mut tree = asia_tree();
        let result = tree.insert(sym(k('B'), &[]));
        assert_eq!(result, Err(BayesTreeError::DuplicateFrontal(k('B'))));
    }

    #[test]
    fn parentless_conditionals_start_new_roots() {
        let mut tree = BayesTree::new();
        tree.insert(sym(k('a'), &[])).expect("a");
        tree.insert(sym(k('b'), &[])).expect("b");
        assert_eq!(tree.roots().count(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn lookup_of_unknown_key_is_not_found() {
        let tree = asia_tree();
        assert!(matches!(
            tree.get(k('Z')),
            Err(BayesTreeError::KeyNotFound(_))
        ));
        assert!(matches!(
            tree.marginal(k('Z')),
            Err(BayesTreeError::KeyNotFound(_))
        ));
    }

    #[test]
    fn symbolic_marginal_is_parentless() {
        let tree = asia_tree();
        let marginal = tree.marginal(k('T')).expect("marginal");
        assert_eq!(marginal, sym(k('T'), &[]));
    }

    #[test]
    fn symbolic_shortcut_of_grandchild() {
        // Natural chain: the shortcut of C(x1) is P(x2 | x6, x7).
        let mut net = BayesNet::new();
        for i in 1..7 {
            net.push_back(sym(x(i), &[x(i + 1)]));
        }
        net.push_back(sym(x(7), &[]));
        let tree = BayesTree::construct(&net).expect("construct");

        let id = tree.clique_id(x(1)).expect("x1");
        let shortcut = tree.shortcut(id).expect("shortcut");
        assert_eq!(shortcut.len(), 1);
        assert_eq!(shortcut[0].frontals(), &[x(2)]);
        assert_eq!(shortcut[0].parents(), &[x(6)]);
    }

    #[test]
    fn joint_keeps_requested_keys() {
        let tree = asia_tree();
        let joint = tree.joint(&[k('S'), k('X')]).expect("joint");
        let frontals: BTreeSet<Key> = joint.frontals().iter().copied().collect();
        assert_eq!(frontals, [k('S'), k('X')].into_iter().collect());
        assert!(joint.parents().is_empty());
    }

    fn long_chain(n: u64) -> BayesNet<SymbolicConditional> {
        let mut net: BayesNet<SymbolicConditional> =
            (1..n).map(|i| sym(x(i), &[x(i + 1)])).collect();
        net.push_back(sym(x(n), &[]));
        net
    }

    #[test]
    fn deep_chain_equality_does_not_recurse() {
        let tree = BayesTree::construct(&long_chain(5000)).expect("construct");
        let deepest = tree.clique_id(x(1)).expect("x1");
        assert_eq!(tree.depth(deepest).expect("depth"), 4998);
        assert!(tree.equals(&tree.clone(), 1e-9));

        let shorter = BayesTree::construct(&long_chain(4999)).expect("construct");
        assert!(!tree.equals(&shorter, 1e-9));
    }

    #[test]
    fn stored_depth_matches_root_path() {
        let tree = asia_tree();
        for clique in tree.cliques() {
            let path = tree.path_to_root(clique.id()).expect("path");
            assert_eq!(clique.depth(), path.len() - 1);
        }
        let root = tree.roots().next().expect("root");
        assert_eq!(tree.depth(root.id()).expect("depth"), 0);
    }

    #[test]
    fn equality_matches_children_by_scope() {
        // Same cliques, children inserted in a different order.
        let mut a = BayesTree::new();
        a.insert(sym(k('r'), &[])).expect("r");
        a.insert(sym(k('p'), &[k('r')])).expect("p");
        a.insert(sym(k('q'), &[k('r')])).expect("q");

        let mut b = BayesTree::new();
        b.insert(sym(k('r'), &[])).expect("r");
        b.insert(sym(k('q'), &[k('r')])).expect("q");
        b.insert(sym(k('p'), &[k('r')])).expect("p");
        assert!(a.equals(&b, 1e-9));

        let mut c = BayesTree::new();
        c.insert(sym(k('r'), &[])).expect("r");
        c.insert(sym(k('p'), &[k('r')])).expect("p");
        c.insert(sym(k('s'), &[k('r')])).expect("s");
        assert!(!a.equals(&c, 1e-9));
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tree: BayesTree<SymbolicConditional> = BayesTree::new();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.size(), 0);
        assert!(tree.validate().is_ok());
    }
}
