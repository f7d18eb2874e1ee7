//! # Sparse Table Factors
//!
//! A `TableFactor` is a non-negative function over a list of discrete
//! variables, stored sparsely as a map from linear index to value. The
//! first key is the most significant digit of the index, so a table over
//! two binary keys is laid out `00 01 10 11`.

use crate::primitives::SPARSE_EPSILON;
use crate::types::{BayesTreeError, DiscreteKey, Key};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Values of discrete variables, by key.
pub type Assignment = BTreeMap<Key, usize>;

/// Sparse table over discrete variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFactor {
    keys: Vec<DiscreteKey>,
    /// Linear index -> value. Zero entries are not stored.
    table: BTreeMap<usize, f64>,
}

/// Row-major strides, last key fastest.
///
/// Every table's dense size fits in `usize` (see [`checked_dense_size`]),
/// so the stride products never saturate.
fn strides(keys: &[DiscreteKey]) -> Vec<usize> {
    let mut strides = vec![1usize; keys.len()];
    for i in (0..keys.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1].saturating_mul(keys[i + 1].cardinality);
    }
    strides
}

fn encode_with(strides: &[usize], values: &[usize]) -> usize {
    strides.iter().zip(values).map(|(s, v)| s * v).sum()
}

fn decode_with(keys: &[DiscreteKey], strides: &[usize], index: usize) -> Vec<usize> {
    keys.iter()
        .zip(strides)
        .map(|(dk, s)| (index / s) % dk.cardinality)
        .collect()
}

fn dense_size_of(keys: &[DiscreteKey]) -> usize {
    checked_dense_size(keys).unwrap_or(usize::MAX)
}

/// Product of the cardinalities, or `InvalidTable` when it overflows.
pub(crate) fn checked_dense_size(keys: &[DiscreteKey]) -> Result<usize, BayesTreeError> {
    keys.iter()
        .try_fold(1usize, |size, dk| size.checked_mul(dk.cardinality))
        .ok_or_else(|| {
            BayesTreeError::InvalidTable(format!(
                "table over {} keys has more entries than fit in memory",
                keys.len()
            ))
        })
}

fn validate_keys(keys: &[DiscreteKey]) -> Result<(), BayesTreeError> {
    let mut seen = BTreeSet::new();
    for dk in keys {
        if dk.cardinality == 0 {
            return Err(BayesTreeError::InvalidTable(format!(
                "{} has cardinality zero",
                dk.key
            )));
        }
        if !seen.insert(dk.key) {
            return Err(BayesTreeError::InvalidTable(format!(
                "{} appears twice",
                dk.key
            )));
        }
    }
    checked_dense_size(keys)?;
    Ok(())
}

fn validate_value(value: f64) -> Result<(), BayesTreeError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BayesTreeError::InvalidTable(format!(
            "value {} is not a finite non-negative number",
            value
        )))
    }
}

impl TableFactor {
    /// Create a table from dense values in `00 01 10 11` order.
    pub fn new(keys: Vec<DiscreteKey>, values: &[f64]) -> Result<Self, BayesTreeError> {
        validate_keys(&keys)?;
        let expected = dense_size_of(&keys);
        if values.len() != expected {
            return Err(BayesTreeError::InvalidTable(format!(
                "expected {} values, got {}",
                expected,
                values.len()
            )));
        }

        let mut table = BTreeMap::new();
        for (index, &value) in values.iter().enumerate() {
            validate_value(value)?;
            if value > SPARSE_EPSILON {
                table.insert(index, value);
            }
        }
        Ok(Self { keys, table })
    }

    /// Create a table from `(linear index, value)` pairs.
    pub fn from_sparse(
        keys: Vec<DiscreteKey>,
        entries: impl IntoIterator<Item = (usize, f64)>,
    ) -> Result<Self, BayesTreeError> {
        validate_keys(&keys)?;
        let size = dense_size_of(&keys);
        let mut table = BTreeMap::new();
        for (index, value) in entries {
            if index >= size {
                return Err(BayesTreeError::InvalidTable(format!(
                    "index {} outside table of size {}",
                    index, size
                )));
            }
            validate_value(value)?;
            if value > SPARSE_EPSILON {
                table.insert(index, value);
            }
        }
        Ok(Self { keys, table })
    }

    /// Table with no variables holding a single value.
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        let mut table = BTreeMap::new();
        if value > SPARSE_EPSILON {
            table.insert(0, value);
        }
        Self {
            keys: Vec::new(),
            table,
        }
    }

    /// Variables in index order.
    #[must_use]
    pub fn keys(&self) -> &[DiscreteKey] {
        &self.keys
    }

    /// Variable keys in index order.
    #[must_use]
    pub fn key_list(&self) -> Vec<Key> {
        self.keys.iter().map(|dk| dk.key).collect()
    }

    /// Position of a key in the index order.
    #[must_use]
    pub fn position(&self, key: Key) -> Option<usize> {
        self.keys.iter().position(|dk| dk.key == key)
    }

    /// Check if the table mentions `key`.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.position(key).is_some()
    }

    /// Number of entries of the equivalent dense table.
    #[must_use]
    pub fn dense_size(&self) -> usize {
        dense_size_of(&self.keys)
    }

    /// Number of stored (non-zero) entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.table.len()
    }

    /// Stored entries as `(linear index, value)`.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.table.iter().map(|(&i, &v)| (i, v))
    }

    /// Value at a linear index (zero when not stored).
    #[must_use]
    pub fn value_at(&self, index: usize) -> f64 {
        self.table.get(&index).copied().unwrap_or(0.0)
    }

    /// Per-key values of a linear index.
    #[must_use]
    pub fn decode(&self, index: usize) -> Vec<usize> {
        decode_with(&self.keys, &strides(&self.keys), index)
    }

    /// Linear index of per-key values.
    #[must_use]
    pub fn encode(&self, values: &[usize]) -> usize {
        encode_with(&strides(&self.keys), values)
    }

    /// Value for an assignment covering every key of the table.
    pub fn evaluate(&self, assignment: &Assignment) -> Result<f64, BayesTreeError> {
        let mut values = Vec::with_capacity(self.keys.len());
        for dk in &self.keys {
            let value = *assignment
                .get(&dk.key)
                .ok_or(BayesTreeError::KeyNotFound(dk.key))?;
            if value >= dk.cardinality {
                return Err(BayesTreeError::InvalidTable(format!(
                    "{} = {} exceeds cardinality {}",
                    dk.key, value, dk.cardinality
                )));
            }
            values.push(value);
        }
        Ok(self.value_at(self.encode(&values)))
    }

    /// Every assignment of the table's variables, in index order.
    #[must_use]
    pub fn assignments(&self) -> Vec<Assignment> {
        let strides = strides(&self.keys);
        (0..self.dense_size())
            .map(|index| {
                self.keys
                    .iter()
                    .map(|dk| dk.key)
                    .zip(decode_with(&self.keys, &strides, index))
                    .collect()
            })
            .collect()
    }

    /// Dense values in index order.
    #[must_use]
    pub fn to_dense(&self) -> Vec<f64> {
        (0..self.dense_size()).map(|i| self.value_at(i)).collect()
    }

    /// Sum of all values.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.table.values().sum()
    }

    /// Pointwise product. The result lists `self`'s keys first.
    pub fn product(&self, other: &Self) -> Result<Self, BayesTreeError> {
        let mut keys = self.keys.clone();
        let mut other_positions = Vec::with_capacity(other.keys.len());
        let mut shared = Vec::new();
        for (other_pos, dk) in other.keys.iter().enumerate() {
            match self.position(dk.key) {
                Some(pos) if self.keys[pos].cardinality != dk.cardinality => {
                    return Err(BayesTreeError::InvalidTable(format!(
                        "{} has cardinality {} and {}",
                        dk.key, self.keys[pos].cardinality, dk.cardinality
                    )));
                }
                Some(pos) => {
                    other_positions.push(pos);
                    shared.push((pos, other_pos));
                }
                None => {
                    other_positions.push(keys.len());
                    keys.push(*dk);
                }
            }
        }

        checked_dense_size(&keys)?;

        // Bucket the other table by its values on the shared keys.
        let other_strides = strides(&other.keys);
        let mut buckets: BTreeMap<Vec<usize>, Vec<(Vec<usize>, f64)>> = BTreeMap::new();
        for (&index, &value) in &other.table {
            let values = decode_with(&other.keys, &other_strides, index);
            let projection = shared.iter().map(|&(_, o)| values[o]).collect();
            buckets.entry(projection).or_default().push((values, value));
        }

        let self_strides = strides(&self.keys);
        let result_strides = strides(&keys);
        let mut table = BTreeMap::new();
        for (&index, &value) in &self.table {
            let values = decode_with(&self.keys, &self_strides, index);
            let projection: Vec<usize> = shared.iter().map(|&(s, _)| values[s]).collect();
            let Some(matches) = buckets.get(&projection) else {
                continue;
            };
            for (other_values, other_value) in matches {
                let mut full = values.clone();
                full.resize(keys.len(), 0);
                for (o, &v) in other_values.iter().enumerate() {
                    full[other_positions[o]] = v;
                }
                let product = value * other_value;
                if product > SPARSE_EPSILON {
                    table.insert(encode_with(&result_strides, &full), product);
                }
            }
        }
        Ok(Self { keys, table })
    }

    /// Sum over the given keys. Keys outside the table are ignored.
    #[must_use]
    pub fn sum_out(&self, keys: &BTreeSet<Key>) -> Self {
        self.reduce(keys, |acc, v| acc + v)
    }

    /// Maximize over the given keys. Keys outside the table are ignored.
    #[must_use]
    pub fn max_out(&self, keys: &BTreeSet<Key>) -> Self {
        self.reduce(keys, f64::max)
    }

    fn reduce(&self, keys: &BTreeSet<Key>, op: impl Fn(f64, f64) -> f64) -> Self {
        let kept: Vec<usize> = (0..self.keys.len())
            .filter(|&i| !keys.contains(&self.keys[i].key))
            .collect();
        let kept_keys: Vec<DiscreteKey> = kept.iter().map(|&i| self.keys[i]).collect();

        let self_strides = strides(&self.keys);
        let kept_strides = strides(&kept_keys);
        let mut table: BTreeMap<usize, f64> = BTreeMap::new();
        for (&index, &value) in &self.table {
            let values = decode_with(&self.keys, &self_strides, index);
            let projected: Vec<usize> = kept.iter().map(|&i| values[i]).collect();
            let target = encode_with(&kept_strides, &projected);
            table
                .entry(target)
                .and_modify(|acc| *acc = op(*acc, value))
                .or_insert(value);
        }
        Self {
            keys: kept_keys,
            table,
        }
    }

    /// Pointwise division by a table over a subset of the keys.
    ///
    /// Entries whose divisor is zero become zero.
    pub fn divide(&self, other: &Self) -> Result<Self, BayesTreeError> {
        let mut positions = Vec::with_capacity(other.keys.len());
        for dk in &other.keys {
            let pos = self.position(dk.key).ok_or_else(|| {
                BayesTreeError::InvalidTable(format!("divisor key {} not in table", dk.key))
            })?;
            positions.push(pos);
        }

        let self_strides = strides(&self.keys);
        let other_strides = strides(&other.keys);
        let mut table = BTreeMap::new();
        for (&index, &value) in &self.table {
            let values = decode_with(&self.keys, &self_strides, index);
            let projected: Vec<usize> = positions.iter().map(|&p| values[p]).collect();
            let divisor = other.value_at(encode_with(&other_strides, &projected));
            if divisor > SPARSE_EPSILON {
                table.insert(index, value / divisor);
            }
        }
        Ok(Self {
            keys: self.keys.clone(),
            table,
        })
    }

    /// Scale so that all values sum to one.
    pub fn normalize(&self) -> Result<Self, BayesTreeError> {
        let total = self.sum();
        if total <= SPARSE_EPSILON {
            return Err(BayesTreeError::InvalidTable(
                "cannot normalize an all-zero table".to_string(),
            ));
        }
        Ok(Self {
            keys: self.keys.clone(),
            table: self.table.iter().map(|(&i, &v)| (i, v / total)).collect(),
        })
    }

    /// Keep only the `max_assignments` largest entries.
    ///
    /// Ties are broken by lower index.
    #[must_use]
    pub fn prune(&self, max_assignments: usize) -> Self {
        let mut entries: Vec<(usize, f64)> = self.entries().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(max_assignments);
        Self {
            keys: self.keys.clone(),
            table: entries.into_iter().collect(),
        }
    }

    /// Same function with keys listed in `order`.
    pub fn permute(&self, order: &[Key]) -> Result<Self, BayesTreeError> {
        if order.len() != self.keys.len() {
            return Err(BayesTreeError::InvalidTable(format!(
                "permutation has {} keys, table has {}",
                order.len(),
                self.keys.len()
            )));
        }
        let mut positions = Vec::with_capacity(order.len());
        for &key in order {
            let pos = self.position(key).ok_or(BayesTreeError::KeyNotFound(key))?;
            positions.push(pos);
        }
        let keys: Vec<DiscreteKey> = positions.iter().map(|&p| self.keys[p]).collect();
        validate_keys(&keys)?;

        let self_strides = strides(&self.keys);
        let new_strides = strides(&keys);
        let table = self
            .table
            .iter()
            .map(|(&index, &value)| {
                let values = decode_with(&self.keys, &self_strides, index);
                let permuted: Vec<usize> = positions.iter().map(|&p| values[p]).collect();
                (encode_with(&new_strides, &permuted), value)
            })
            .collect();
        Ok(Self { keys, table })
    }

    /// Fix the keys named in `assignment`; the result is over the rest.
    #[must_use]
    pub fn restrict(&self, assignment: &Assignment) -> Self {
        let kept: Vec<usize> = (0..self.keys.len())
            .filter(|&i| !assignment.contains_key(&self.keys[i].key))
            .collect();
        let kept_keys: Vec<DiscreteKey> = kept.iter().map(|&i| self.keys[i]).collect();

        let self_strides = strides(&self.keys);
        let kept_strides = strides(&kept_keys);
        let table = self
            .table
            .iter()
            .filter_map(|(&index, &value)| {
                let values = decode_with(&self.keys, &self_strides, index);
                let matches = self.keys.iter().zip(&values).all(|(dk, v)| {
                    assignment.get(&dk.key).is_none_or(|fixed| fixed == v)
                });
                matches.then(|| {
                    let projected: Vec<usize> = kept.iter().map(|&i| values[i]).collect();
                    (encode_with(&kept_strides, &projected), value)
                })
            })
            .collect();
        Self {
            keys: kept_keys,
            table,
        }
    }

    /// Same variables (in any order) and values within `tol`.
    #[must_use]
    pub fn equals(&self, other: &Self, tol: f64) -> bool {
        let Ok(other) = other.permute(&self.key_list()) else {
            return false;
        };
        if other.keys != self.keys {
            return false;
        }
        self.table
            .keys()
            .chain(other.table.keys())
            .all(|&i| (self.value_at(i) - other.value_at(i)).abs() <= tol)
    }
}

// =============================================================================
// TESTS
// =============================================================================
