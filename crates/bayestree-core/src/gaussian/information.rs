//! # Information Form
//!
//! A Gaussian potential `exp(-½ xᵀ Λ x + ηᵀ x)` over a list of vector
//! variables. Blocks of `Λ` and `η` follow the key list; each key spans
//! `dim(key)` consecutive scalar rows.

use super::linalg::{solve_spd, solve_spd_vector};
use crate::types::{BayesTreeError, Key};
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct InformationForm {
    keys: Vec<Key>,
    dims: BTreeMap<Key, usize>,
    matrix: Array2<f64>,
    vector: Array1<f64>,
}

impl InformationForm {
    pub(crate) fn new(
        keys: &[(Key, usize)],
        matrix: Array2<f64>,
        vector: Array1<f64>,
    ) -> Result<Self, BayesTreeError> {
        let mut dims = BTreeMap::new();
        for &(key, dim) in keys {
            if dims.insert(key, dim).is_some() {
                return Err(BayesTreeError::DegenerateCombination(key));
            }
        }
        let total: usize = keys.iter().map(|&(_, d)| d).sum();
        let first = keys.first().map_or(Key(0), |&(k, _)| k);
        if matrix.nrows() != total || matrix.ncols() != total {
            return Err(BayesTreeError::DimensionMismatch {
                key: first,
                expected: total,
                actual: matrix.nrows().max(matrix.ncols()),
            });
        }
        if vector.len() != total {
            return Err(BayesTreeError::DimensionMismatch {
                key: first,
                expected: total,
                actual: vector.len(),
            });
        }
        Ok(Self {
            keys: keys.iter().map(|&(k, _)| k).collect(),
            dims,
            matrix,
            vector,
        })
    }

    /// Whitened linear measurement `Σ_k A_k x_k = b` with per-row `sigmas`.
    pub(crate) fn from_measurement(
        blocks: &[(Key, Array2<f64>)],
        rhs: &Array1<f64>,
        sigmas: &Array1<f64>,
    ) -> Result<Self, BayesTreeError> {
        let rows = rhs.len();
        let (first, _) = blocks
            .first()
            .ok_or_else(|| BayesTreeError::InvalidTable("measurement without keys".to_string()))?;
        if sigmas.len() != rows {
            return Err(BayesTreeError::DimensionMismatch {
                key: *first,
                expected: rows,
                actual: sigmas.len(),
            });
        }
        if sigmas.iter().any(|&s| !s.is_finite() || s <= 0.0) {
            return Err(BayesTreeError::NotPositiveDefinite);
        }

        let mut keys = Vec::with_capacity(blocks.len());
        let mut columns = Vec::with_capacity(blocks.len());
        for (key, block) in blocks {
            if block.nrows() != rows {
                return Err(BayesTreeError::DimensionMismatch {
                    key: *key,
                    expected: rows,
                    actual: block.nrows(),
                });
            }
            keys.push((*key, block.ncols()));
            columns.push(block.view());
        }
        let a = ndarray::concatenate(Axis(1), &columns)
            .map_err(|e| BayesTreeError::InvalidTable(e.to_string()))?;

        let weights = sigmas.mapv(|s| 1.0 / s);
        let whitened = &a * &weights.clone().insert_axis(Axis(1));
        let b = rhs * &weights;
        let matrix = whitened.t().dot(&whitened);
        let vector = whitened.t().dot(&b);
        Self::new(&keys, matrix, vector)
    }

    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn dim(&self, key: Key) -> Option<usize> {
        self.dims.get(&key).copied()
    }

    pub(crate) fn dims(&self) -> &BTreeMap<Key, usize> {
        &self.dims
    }

    pub(crate) fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub(crate) fn vector(&self) -> &Array1<f64> {
        &self.vector
    }

    /// Scalar row indices of `keys`, in order.
    fn indices(&self, keys: &[Key]) -> Result<Vec<usize>, BayesTreeError> {
        let mut offsets = BTreeMap::new();
        let mut offset = 0;
        for key in &self.keys {
            let dim = self.dims.get(key).copied().unwrap_or(0);
            offsets.insert(*key, (offset, dim));
            offset += dim;
        }
        let mut indices = Vec::new();
        for key in keys {
            let &(start, dim) = offsets.get(key).ok_or(BayesTreeError::KeyNotFound(*key))?;
            indices.extend(start..start + dim);
        }
        Ok(indices)
    }

    /// Sub-matrix with rows of `rows` and columns of `cols`.
    pub(crate) fn block(&self, rows: &[Key], cols: &[Key]) -> Result<Array2<f64>, BayesTreeError> {
        let r = self.indices(rows)?;
        let c = self.indices(cols)?;
        Ok(self.matrix.select(Axis(0), &r).select(Axis(1), &c))
    }

    /// Sub-vector for `keys`.
    pub(crate) fn segment(&self, keys: &[Key]) -> Result<Array1<f64>, BayesTreeError> {
        Ok(self.vector.select(Axis(0), &self.indices(keys)?))
    }

    /// Sum of potentials laid out over `order`.
    ///
    /// Every key of every part must be in `order` with a consistent dimension.
    pub(crate) fn sum<'a>(
        parts: impl IntoIterator<Item = &'a Self>,
        order: &[Key],
    ) -> Result<Self, BayesTreeError> {
        let parts: Vec<&Self> = parts.into_iter().collect();
        let mut dims: BTreeMap<Key, usize> = BTreeMap::new();
        for part in &parts {
            for (&key, &dim) in &part.dims {
                match dims.insert(key, dim) {
                    Some(previous) if previous != dim => {
                        return Err(BayesTreeError::DimensionMismatch {
                            key,
                            expected: previous,
                            actual: dim,
                        });
                    }
                    _ => {}
                }
            }
        }
        let mut layout = Vec::with_capacity(order.len());
        for key in order {
            let dim = dims.get(key).copied().ok_or(BayesTreeError::KeyNotFound(*key))?;
            layout.push((*key, dim));
        }
        let total: usize = layout.iter().map(|&(_, d)| d).sum();
        let mut result = Self::new(&layout, Array2::zeros((total, total)), Array1::zeros(total))?;
        for part in parts {
            result.scatter(part, 1.0)?;
        }
        Ok(result)
    }

    /// Add `sign * other` into the matching blocks of `self`.
    pub(crate) fn scatter(&mut self, other: &Self, sign: f64) -> Result<(), BayesTreeError> {
        let map = self.indices(&other.keys)?;
        for (i, &ti) in map.iter().enumerate() {
            self.vector[ti] += sign * other.vector[i];
            for (j, &tj) in map.iter().enumerate() {
                self.matrix[[ti, tj]] += sign * other.matrix[[i, j]];
            }
        }
        Ok(())
    }

    /// Integrate out `removed` via the Schur complement.
    ///
    /// Surviving keys keep their relative order.
    pub(crate) fn marginalize(&self, removed: &[Key]) -> Result<Self, BayesTreeError> {
        let kept: Vec<Key> = self
            .keys
            .iter()
            .filter(|k| !removed.contains(k))
            .copied()
            .collect();
        let layout: Vec<(Key, usize)> = kept
            .iter()
            .map(|k| (*k, self.dims.get(k).copied().unwrap_or(0)))
            .collect();
        if removed.is_empty() {
            return Ok(self.clone());
        }

        let lee = self.block(removed, removed)?;
        let ler = self.block(removed, &kept)?;
        let lrr = self.block(&kept, &kept)?;
        let ee = self.segment(removed)?;
        let er = self.segment(&kept)?;

        let x = solve_spd(&lee, &ler)?;
        let y = solve_spd_vector(&lee, &ee)?;
        let matrix = lrr - ler.t().dot(&x);
        let vector = er - ler.t().dot(&y);
        Self::new(&layout, matrix, vector)
    }

    /// Same keys (in any order), dimensions and entries within `tol`.
    pub(crate) fn equals(&self, other: &Self, tol: f64) -> bool {
        if self.dims != other.dims {
            return false;
        }
        let Ok(map) = other.indices(&self.keys) else {
            return false;
        };
        map.iter().enumerate().all(|(i, &oi)| {
            (self.vector[i] - other.vector[oi]).abs() <= tol
                && map
                    .iter()
                    .enumerate()
                    .all(|(j, &oj)| (self.matrix[[i, j]] - other.matrix[[oi, oj]]).abs() <= tol)
        })
    }
}
