//! # Property-Based Tests
//!
//! Tree invariants and marginal correctness over random chains and
//! elimination orderings.

use bayestree_core::{
    BayesTree, Conditional, DEFAULT_TOLERANCE, DiscreteFactorGraph, DiscreteKey,
    GaussianFactorGraph, Key, TableFactor,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn x(i: u64) -> Key {
    Key::symbol('x', i)
}

/// A chain length together with a random elimination ordering of it.
fn chain_and_ordering() -> impl Strategy<Value = (u64, Vec<Key>)> {
    (2u64..9).prop_flat_map(|n| {
        let keys: Vec<Key> = (1..=n).map(x).collect();
        (Just(n), Just(keys).prop_shuffle())
    })
}

fn discrete_chain(n: u64, values: &[f64]) -> DiscreteFactorGraph {
    let mut graph = DiscreteFactorGraph::new();
    for i in 1..n {
        let offset = ((i - 1) as usize * 4) % values.len().saturating_sub(3).max(1);
        let table = &values[offset..offset + 4];
        graph.add(
            TableFactor::new(
                vec![DiscreteKey::new(x(i), 2), DiscreteKey::new(x(i + 1), 2)],
                table,
            )
            .expect("pair"),
        );
    }
    graph
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Any elimination ordering of a chain yields a valid tree holding every key.
    #[test]
    fn any_ordering_builds_valid_tree((n, ordering) in chain_and_ordering()) {
        let net = GaussianFactorGraph::smoother(n)
            .expect("smoother")
            .eliminate_sequential(&ordering)
            .expect("eliminate");
        let tree = BayesTree::construct(&net).expect("construct");

        prop_assert_eq!(tree.size(), n as usize);
        prop_assert!(tree.validate().is_ok());
        let frontal_total: usize = tree.cliques().map(|c| c.size()).sum();
        prop_assert_eq!(frontal_total, n as usize);
    }

    /// Gaussian marginals do not depend on the elimination ordering.
    #[test]
    fn gaussian_marginals_are_ordering_invariant((n, ordering) in chain_and_ordering()) {
        let graph = GaussianFactorGraph::smoother(n).expect("smoother");
        let natural: Vec<Key> = (1..=n).map(x).collect();

        let reference = BayesTree::construct(
            &graph.eliminate_sequential(&natural).expect("natural"),
        )
        .expect("construct");
        let shuffled = BayesTree::construct(
            &graph.eliminate_sequential(&ordering).expect("shuffled"),
        )
        .expect("construct");

        for key in natural {
            let a = reference.marginal(key).expect("reference");
            let b = shuffled.marginal(key).expect("shuffled");
            prop_assert!(a.equals(&b, 1e-8));
        }
    }

    /// Discrete marginals from the tree match brute-force summation.
    #[test]
    fn discrete_marginals_match_brute_force(
        (n, ordering) in chain_and_ordering(),
        values in vec(0.05f64..1.0, 8..16),
    ) {
        let graph = discrete_chain(n, &values);
        let tree = BayesTree::construct(&graph.eliminate_sequential(&ordering).expect("eliminate"))
            .expect("construct");
        let joint = graph.joint().expect("joint");

        for i in 1..=n {
            let others: BTreeSet<Key> = (1..=n).map(x).filter(|&k| k != x(i)).collect();
            let expected = joint.sum_out(&others).normalize().expect("normalize");
            let marginal = tree.marginal(x(i)).expect("marginal");
            prop_assert!(marginal.table().equals(&expected, 1e-9));
        }
    }

    /// Repeated queries give identical answers.
    #[test]
    fn queries_are_repeatable((n, ordering) in chain_and_ordering()) {
        let net = GaussianFactorGraph::smoother(n)
            .expect("smoother")
            .eliminate_sequential(&ordering)
            .expect("eliminate");
        let tree = BayesTree::construct(&net).expect("construct");

        for key in &ordering {
            let first = tree.marginal(*key).expect("first");
            let second = tree.marginal(*key).expect("second");
            prop_assert!(first.equals(&second, 0.0));
        }
        let keys = [ordering[0], ordering[ordering.len() - 1]];
        let joint = tree.joint(&keys).expect("joint");
        prop_assert_eq!(joint.frontals().len(), 2);
        prop_assert!(joint.parents().is_empty());
        prop_assert!(tree.equals(&tree.clone(), DEFAULT_TOLERANCE));
    }
}
