//! # Table Conditionals
//!
//! `P(frontals | parents)` stored as a `TableFactor` whose key list is the
//! frontals followed by the parents.

use super::table::{Assignment, TableFactor, checked_dense_size};
use crate::conditional::{Conditional, combined_structure, surviving_frontals};
use crate::types::{BayesTreeError, DiscreteKey, Key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Discrete conditional over a sparse table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConditional {
    frontals: Vec<Key>,
    parents: Vec<Key>,
    table: TableFactor,
}

impl TableConditional {
    /// Wrap a table whose first `nr_frontals` keys are the frontals.
    ///
    /// The table is normalized so that it sums to one over the frontals
    /// for every parent assignment.
    pub fn from_factor(nr_frontals: usize, factor: TableFactor) -> Result<Self, BayesTreeError> {
        if nr_frontals == 0 || nr_frontals > factor.keys().len() {
            return Err(BayesTreeError::InvalidTable(format!(
                "{} frontals requested from a table over {} keys",
                nr_frontals,
                factor.keys().len()
            )));
        }
        let keys = factor.key_list();
        let frontals = keys[..nr_frontals].to_vec();
        let parents = keys[nr_frontals..].to_vec();

        let frontal_set: BTreeSet<Key> = frontals.iter().copied().collect();
        let normalizer = factor.sum_out(&frontal_set);
        let table = factor.divide(&normalizer)?;
        Ok(Self {
            frontals,
            parents,
            table,
        })
    }

    /// `P(key | parents)` from dense values laid out key first.
    pub fn new(
        key: DiscreteKey,
        parents: &[DiscreteKey],
        values: &[f64],
    ) -> Result<Self, BayesTreeError> {
        let mut keys = vec![key];
        keys.extend_from_slice(parents);
        Self::from_factor(1, TableFactor::new(keys, values)?)
    }

    /// `P(key | parents)` from a signature string such as `"9/1 2/8 3/7 1/9"`.
    ///
    /// Each whitespace-separated row holds the weights of `key`'s values
    /// for one parent assignment, separated by `/`. Rows follow the parent
    /// assignments with the first parent most significant. Rows are
    /// normalized.
    pub fn from_signature(
        key: DiscreteKey,
        parents: &[DiscreteKey],
        signature: &str,
    ) -> Result<Self, BayesTreeError> {
        let rows: Vec<&str> = signature.split_whitespace().collect();
        let expected_rows = checked_dense_size(parents)?;
        let mut keys = vec![key];
        keys.extend_from_slice(parents);
        checked_dense_size(&keys)?;
        if rows.len() != expected_rows {
            return Err(BayesTreeError::InvalidTable(format!(
                "signature for {} has {} rows, expected {}",
                key.key,
                rows.len(),
                expected_rows
            )));
        }

        let mut values = vec![0.0; key.cardinality * expected_rows];
        for (row_index, row) in rows.iter().enumerate() {
            let weights = row
                .split('/')
                .map(|w| {
                    w.parse::<f64>().map_err(|_| {
                        BayesTreeError::InvalidTable(format!("bad weight '{}' in signature", w))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            if weights.len() != key.cardinality {
                return Err(BayesTreeError::InvalidTable(format!(
                    "row '{}' has {} weights, {} has cardinality {}",
                    row,
                    weights.len(),
                    key.key,
                    key.cardinality
                )));
            }
            for (value, weight) in weights.into_iter().enumerate() {
                values[value * expected_rows + row_index] = weight;
            }
        }
        Self::new(key, parents, &values)
    }

    /// Parentless distribution over `keys`, normalized.
    pub fn distribution(keys: Vec<DiscreteKey>, values: &[f64]) -> Result<Self, BayesTreeError> {
        let nr_frontals = keys.len();
        Self::from_factor(nr_frontals, TableFactor::new(keys, values)?)
    }

    /// `P(X | Y) = P(X, Y) / P(Y)`.
    ///
    /// The frontals are the joint's keys that `marginal` does not mention,
    /// in the joint's order.
    pub fn from_joint(joint: &TableFactor, marginal: &TableFactor) -> Result<Self, BayesTreeError> {
        let marginal_keys = marginal.key_list();
        if let Some(&key) = marginal_keys.iter().find(|k| !joint.contains(**k)) {
            return Err(BayesTreeError::KeyNotFound(key));
        }
        let frontals: Vec<Key> = joint
            .key_list()
            .into_iter()
            .filter(|k| !marginal_keys.contains(k))
            .collect();
        if frontals.is_empty() {
            return Err(BayesTreeError::InvalidTable(
                "joint and marginal have the same keys".to_string(),
            ));
        }

        let order: Vec<Key> = frontals.iter().chain(&marginal_keys).copied().collect();
        let table = joint.permute(&order)?.divide(marginal)?;
        Ok(Self {
            frontals,
            parents: marginal_keys,
            table,
        })
    }

    /// Underlying table, frontals first.
    #[must_use]
    pub fn table(&self) -> &TableFactor {
        &self.table
    }

    /// Frontal and parent variables with their cardinalities.
    #[must_use]
    pub fn discrete_keys(&self) -> &[DiscreteKey] {
        self.table.keys()
    }

    /// Probability of a full assignment of frontals and parents.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<f64, BayesTreeError> {
        self.table.evaluate(assignment)
    }

    /// Natural log of `evaluate`; `-inf` for impossible assignments.
    pub fn log_probability(&self, assignment: &Assignment) -> Result<f64, BayesTreeError> {
        Ok(self.evaluate(assignment)?.ln())
    }

    fn single_frontal(&self) -> Result<Key, BayesTreeError> {
        match self.frontals.as_slice() {
            [key] => Ok(*key),
            _ => Err(BayesTreeError::InvalidTable(format!(
                "operation needs exactly one frontal, conditional has {}",
                self.frontals.len()
            ))),
        }
    }

    /// Most probable value of the single frontal given parent values.
    ///
    /// Ties go to the lowest value.
    pub fn argmax(&self, parents: &Assignment) -> Result<usize, BayesTreeError> {
        let key = self.single_frontal()?;
        if let Some(&missing) = self.parents.iter().find(|p| !parents.contains_key(p)) {
            return Err(BayesTreeError::KeyNotFound(missing));
        }
        let fixed: Assignment = self
            .parents
            .iter()
            .filter_map(|p| parents.get(p).map(|&v| (*p, v)))
            .collect();
        let row = self.table.restrict(&fixed);

        let mut best = (0, f64::NEG_INFINITY);
        for (index, value) in row.entries() {
            if value > best.1 {
                best = (index, value);
            }
        }
        tracing::trace!(key = %key, value = best.0, "argmax");
        Ok(best.0)
    }

    /// Likelihood of the parents given an observed frontal value.
    pub fn likelihood(&self, value: usize) -> Result<TableFactor, BayesTreeError> {
        let key = self.single_frontal()?;
        let fixed: Assignment = [(key, value)].into_iter().collect();
        Ok(self.table.restrict(&fixed))
    }

    /// Keep the `max_assignments` most probable entries, renormalized.
    pub fn prune(&self, max_assignments: usize) -> Result<Self, BayesTreeError> {
        let pruned = self.table.prune(max_assignments);
        let frontal_set: BTreeSet<Key> = self.frontals.iter().copied().collect();
        let normalizer = pruned.sum_out(&frontal_set);
        Ok(Self {
            frontals: self.frontals.clone(),
            parents: self.parents.clone(),
            table: pruned.divide(&normalizer)?,
        })
    }

    /// Maximize the table over `keys`.
    #[must_use]
    pub fn max(&self, keys: &BTreeSet<Key>) -> TableFactor {
        self.table.max_out(keys)
    }

    /// Every assignment of the frontal variables, first frontal most
    /// significant.
    #[must_use]
    pub fn frontal_assignments(&self) -> Vec<Assignment> {
        let parent_set: BTreeSet<Key> = self.parents.iter().copied().collect();
        self.table.max_out(&parent_set).assignments()
    }

    /// Every assignment of frontals and parents, in table order.
    #[must_use]
    pub fn all_assignments(&self) -> Vec<Assignment> {
        self.table.assignments()
    }

    /// Dense probabilities in table order.
    #[must_use]
    pub fn probabilities(&self) -> Vec<f64> {
        self.table.to_dense()
    }
}

impl Conditional for TableConditional {
    fn frontals(&self) -> &[Key] {
        &self.frontals
    }

    fn parents(&self) -> &[Key] {
        &self.parents
    }

    fn combine(&self, other: &Self) -> Result<Self, BayesTreeError> {
        let (frontals, parents) =
            combined_structure(&self.frontals, &self.parents, &other.frontals, &other.parents)?;
        let order: Vec<Key> = frontals.iter().chain(&parents).copied().collect();
        let table = self.table.product(&other.table)?.permute(&order)?;
        Ok(Self {
            frontals,
            parents,
            table,
        })
    }

    fn eliminate(&self, keys: &BTreeSet<Key>) -> Result<Self, BayesTreeError> {
        let frontals = surviving_frontals(&self.frontals, &self.parents, keys)?;
        let removed: BTreeSet<Key> = self
            .frontals
            .iter()
            .filter(|k| keys.contains(k))
            .copied()
            .collect();
        Ok(Self {
            frontals,
            parents: self.parents.clone(),
            table: self.table.sum_out(&removed),
        })
    }

    fn equals(&self, other: &Self, tol: f64) -> bool {
        let same_set = |a: &[Key], b: &[Key]| {
            a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
        };
        same_set(&self.frontals, &other.frontals)
            && same_set(&self.parents, &other.parents)
            && self.table.equals(&other.table, tol)
    }
}

// =============================================================================
// TESTS
// =============================================================================
