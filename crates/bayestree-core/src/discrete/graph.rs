//! # Discrete Factor Graphs
//!
//! A bag of table factors and sequential variable elimination into a
//! Bayes net of `TableConditional`s.

use super::conditional::TableConditional;
use super::table::TableFactor;
use crate::conditional::BayesNet;
use crate::types::{BayesTreeError, Key};
use std::collections::{BTreeMap, BTreeSet};

/// Undirected collection of discrete factors.
#[derive(Debug, Clone, Default)]
pub struct DiscreteFactorGraph {
    factors: Vec<TableFactor>,
}

impl DiscreteFactorGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a factor.
    pub fn add(&mut self, factor: TableFactor) {
        self.factors.push(factor);
    }

    /// Factors in insertion order.
    #[must_use]
    pub fn factors(&self) -> &[TableFactor] {
        &self.factors
    }

    /// Number of factors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Check if the graph has no factors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Every key mentioned by some factor.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<Key> {
        self.factors.iter().flat_map(TableFactor::key_list).collect()
    }

    /// Product of all factors.
    pub fn joint(&self) -> Result<TableFactor, BayesTreeError> {
        self.factors
            .iter()
            .try_fold(TableFactor::scalar(1.0), |acc, f| acc.product(f))
    }

    /// Eliminate variables in `ordering`, producing a Bayes net in the same
    /// order.
    ///
    /// Each step multiplies the factors that mention the key, divides the
    /// product by its marginal to get the conditional, and returns the
    /// marginal to the graph. Parents are listed in elimination order.
    /// Every key of the graph must appear in `ordering`.
    pub fn eliminate_sequential(
        &self,
        ordering: &[Key],
    ) -> Result<BayesNet<TableConditional>, BayesTreeError> {
        let position: BTreeMap<Key, usize> =
            ordering.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        if let Some(&key) = self.keys().iter().find(|k| !position.contains_key(k)) {
            return Err(BayesTreeError::InvalidElimination {
                key,
                reason: "key is missing from the elimination ordering".to_string(),
            });
        }

        let mut factors = self.factors.clone();
        let mut net = BayesNet::new();
        for &key in ordering {
            let (involved, rest): (Vec<_>, Vec<_>) =
                factors.into_iter().partition(|f| f.contains(key));
            factors = rest;
            if involved.is_empty() {
                return Err(BayesTreeError::KeyNotFound(key));
            }

            let product = involved
                .iter()
                .try_fold(TableFactor::scalar(1.0), |acc, f| acc.product(f))?;
            let mut order: Vec<Key> = product
                .key_list()
                .into_iter()
                .filter(|&k| k != key)
                .collect();
            order.sort_by_key(|k| position.get(k).copied().unwrap_or(usize::MAX));
            order.insert(0, key);
            let joint = product.permute(&order)?;

            let eliminated: BTreeSet<Key> = [key].into_iter().collect();
            let marginal = joint.sum_out(&eliminated);
            let conditional = TableConditional::from_joint(&joint, &marginal)?;
            tracing::trace!(key = %key, parents = order.len() - 1, "eliminated discrete variable");

            net.push_back(conditional);
            if !marginal.keys().is_empty() {
                factors.push(marginal);
            }
        }
        Ok(net)
    }
}

// =============================================================================
// TESTS
// =============================================================================
