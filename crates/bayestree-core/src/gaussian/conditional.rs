//! # Gaussian Conditionals
//!
//! `P(frontals | parents)` for vector-valued variables, stored in
//! information form over the frontals followed by the parents.

use super::information::InformationForm;
use super::linalg::{cholesky, inverse_spd, solve_spd_vector};
use crate::conditional::{Conditional, combined_structure, surviving_frontals};
use crate::types::{BayesTreeError, Key};
use ndarray::{Array1, Array2};
use std::collections::{BTreeMap, BTreeSet};

/// Gaussian conditional density.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianConditional {
    frontals: Vec<Key>,
    parents: Vec<Key>,
    info: InformationForm,
}

impl GaussianConditional {
    /// `R x + Σ Sᵢ pᵢ = d` with independent noise `sigmas` per row.
    ///
    /// `r` must be square and invertible; each `Sᵢ` has as many rows as `r`.
    pub fn new(
        key: Key,
        r: Array2<f64>,
        parents: Vec<(Key, Array2<f64>)>,
        d: Array1<f64>,
        sigmas: Array1<f64>,
    ) -> Result<Self, BayesTreeError> {
        Self::from_blocks(&[(key, r)], &parents, &d, &sigmas)
    }

    /// Parentless conditional `x ~ N(mean, diag(sigmas²))`.
    pub fn prior(key: Key, mean: Array1<f64>, sigmas: Array1<f64>) -> Result<Self, BayesTreeError> {
        let r = Array2::eye(mean.len());
        Self::new(key, r, Vec::new(), mean, sigmas)
    }

    /// Multi-frontal form of [`GaussianConditional::new`].
    pub fn from_blocks(
        frontals: &[(Key, Array2<f64>)],
        parents: &[(Key, Array2<f64>)],
        d: &Array1<f64>,
        sigmas: &Array1<f64>,
    ) -> Result<Self, BayesTreeError> {
        let frontal_keys: Vec<Key> = frontals.iter().map(|(k, _)| *k).collect();
        let parent_keys: Vec<Key> = parents.iter().map(|(k, _)| *k).collect();
        let Some(&first) = frontal_keys.first() else {
            return Err(BayesTreeError::InvalidTable(
                "a conditional needs at least one frontal variable".to_string(),
            ));
        };
        if let Some(&key) = frontal_keys.iter().find(|k| parent_keys.contains(k)) {
            return Err(BayesTreeError::DegenerateCombination(key));
        }
        let frontal_dim: usize = frontals.iter().map(|(_, r)| r.ncols()).sum();
        if frontal_dim != d.len() {
            return Err(BayesTreeError::DimensionMismatch {
                key: first,
                expected: d.len(),
                actual: frontal_dim,
            });
        }

        let blocks: Vec<(Key, Array2<f64>)> = frontals.iter().chain(parents).cloned().collect();
        let info = InformationForm::from_measurement(&blocks, d, sigmas)?;
        // R must be invertible.
        cholesky(&info.block(&frontal_keys, &frontal_keys)?)?;
        Ok(Self {
            frontals: frontal_keys,
            parents: parent_keys,
            info,
        })
    }

    pub(crate) fn from_information(
        frontals: Vec<Key>,
        parents: Vec<Key>,
        info: InformationForm,
    ) -> Self {
        Self {
            frontals,
            parents,
            info,
        }
    }

    /// Dimension of a frontal or parent variable.
    #[must_use]
    pub fn dim(&self, key: Key) -> Option<usize> {
        self.info.dim(key)
    }

    /// Total dimension of the frontal variables.
    #[must_use]
    pub fn frontal_dim(&self) -> usize {
        self.frontals.iter().filter_map(|k| self.dim(*k)).sum()
    }

    /// Information matrix over frontals then parents.
    #[must_use]
    pub fn information_matrix(&self) -> &Array2<f64> {
        self.info.matrix()
    }

    /// Information vector over frontals then parents.
    #[must_use]
    pub fn information_vector(&self) -> &Array1<f64> {
        self.info.vector()
    }

    /// Conditional mean of the frontals for the given parent values.
    pub fn mean_given(
        &self,
        parent_values: &BTreeMap<Key, Array1<f64>>,
    ) -> Result<BTreeMap<Key, Array1<f64>>, BayesTreeError> {
        let lff = self.info.block(&self.frontals, &self.frontals)?;
        let mut rhs = self.info.segment(&self.frontals)?;
        if !self.parents.is_empty() {
            let mut values = Vec::new();
            for parent in &self.parents {
                let value = parent_values
                    .get(parent)
                    .ok_or(BayesTreeError::KeyNotFound(*parent))?;
                let expected = self.dim(*parent).unwrap_or(0);
                if value.len() != expected {
                    return Err(BayesTreeError::DimensionMismatch {
                        key: *parent,
                        expected,
                        actual: value.len(),
                    });
                }
                values.extend(value.iter().copied());
            }
            let lfp = self.info.block(&self.frontals, &self.parents)?;
            rhs = rhs - lfp.dot(&Array1::from(values));
        }

        let solution = solve_spd_vector(&lff, &rhs)?;
        let mut means = BTreeMap::new();
        let mut offset = 0;
        for key in &self.frontals {
            let dim = self.dim(*key).unwrap_or(0);
            means.insert(
                *key,
                solution.slice(ndarray::s![offset..offset + dim]).to_owned(),
            );
            offset += dim;
        }
        Ok(means)
    }

    /// Mean of a parentless conditional.
    pub fn mean(&self) -> Result<BTreeMap<Key, Array1<f64>>, BayesTreeError> {
        self.mean_given(&BTreeMap::new())
    }

    /// Covariance of the frontals given the parents.
    ///
    /// For a parentless conditional this is the joint covariance.
    pub fn covariance(&self) -> Result<Array2<f64>, BayesTreeError> {
        inverse_spd(&self.info.block(&self.frontals, &self.frontals)?)
    }

    /// Standard deviations: square roots of the covariance diagonal.
    pub fn sigmas(&self) -> Result<Array1<f64>, BayesTreeError> {
        Ok(self.covariance()?.diag().mapv(f64::sqrt))
    }
}

impl Conditional for GaussianConditional {
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
        let info = InformationForm::sum([&self.info, &other.info], &order)?;
        Ok(Self {
            frontals,
            parents,
            info,
        })
    }

    fn eliminate(&self, keys: &BTreeSet<Key>) -> Result<Self, BayesTreeError> {
        let frontals = surviving_frontals(&self.frontals, &self.parents, keys)?;
        let removed: Vec<Key> = self
            .frontals
            .iter()
            .filter(|k| keys.contains(k))
            .copied()
            .collect();
        Ok(Self {
            frontals,
            parents: self.parents.clone(),
            info: self.info.marginalize(&removed)?,
        })
    }

    fn equals(&self, other: &Self, tol: f64) -> bool {
        let same_set = |a: &[Key], b: &[Key]| {
            a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
        };
        same_set(&self.frontals, &other.frontals)
            && same_set(&self.parents, &other.parents)
            && self.info.equals(&other.info, tol)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn x(i: u64) -> Key {
        Key::symbol('x', i)
    }

    /// `x2 ~ N(1, 1)` and `x1 = x2 + 1 + N(0, 1)`.
    fn chain() -> (GaussianConditional, GaussianConditional) {
        let x2 = GaussianConditional::prior(x(2), array![1.0], array![1.0]).expect("x2");
        let x1 = GaussianConditional::new(
            x(1),
            array![[1.0]],
            vec![(x(2), array![[-1.0]])],
            array![1.0],
            array![1.0],
        )
        .expect("x1|x2");
        (x1, x2)
    }

    #[test]
    fn prior_has_given_mean_and_sigma() {
        let c = GaussianConditional::prior(x(1), array![2.0, -1.0], array![0.5, 2.0]).expect("prior");
        let mean = c.mean().expect("mean");
        assert_eq!(mean[&x(1)], array![2.0, -1.0]);
        let sigmas = c.sigmas().expect("sigmas");
        assert!((sigmas[0] - 0.5).abs() < 1e-12);
        assert!((sigmas[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn conditional_mean_uses_parents() {
        let (x1, _) = chain();
        let parents: BTreeMap<Key, Array1<f64>> = [(x(2), array![3.0])].into_iter().collect();
        let mean = x1.mean_given(&parents).expect("mean");
        assert!((mean[&x(1)][0] - 4.0).abs() < 1e-12);
        assert!(x1.mean().is_err());
    }

    #[test]
    fn combine_and_eliminate_gives_marginal() {
        let (x1, x2) = chain();
        let joint = x1.combine(&x2).expect("joint");
        assert_eq!(joint.frontals(), &[x(1), x(2)]);
        assert!(joint.parents().is_empty());

        let remove: BTreeSet<Key> = [x(2)].into_iter().collect();
        let marginal = joint.eliminate(&remove).expect("marginal");
        // x1 = x2 + 1 + noise: mean 2, variance 2
        let mean = marginal.mean().expect("mean");
        assert!((mean[&x(1)][0] - 2.0).abs() < 1e-12);
        let sigmas = marginal.sigmas().expect("sigmas");
        assert!((sigmas[0] - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn eliminating_a_parent_fails() {
        let (x1, _) = chain();
        let remove: BTreeSet<Key> = [x(2)].into_iter().collect();
        assert!(matches!(
            x1.eliminate(&remove),
            Err(BayesTreeError::InvalidElimination { .. })
        ));
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(matches!(
            GaussianConditional::new(x(1), array![[1.0]], vec![], array![1.0, 2.0], array![1.0, 1.0]),
            Err(BayesTreeError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            GaussianConditional::new(x(1), array![[0.0]], vec![], array![1.0], array![1.0]),
            Err(BayesTreeError::NotPositiveDefinite)
        ));
        assert!(matches!(
            GaussianConditional::prior(x(1), array![0.0], array![-1.0]),
            Err(BayesTreeError::NotPositiveDefinite)
        ));
    }

    #[test]
    fn equality_is_order_insensitive() {
        let (x1, x2) = chain();
        let a = x1.combine(&x2).expect("a");
        let b = GaussianConditional::from_information(
            vec![x(2), x(1)],
            Vec::new(),
            InformationForm::sum([&x2.info, &x1.info], &[x(2), x(1)]).expect("info"),
        );
        assert!(a.equals(&b, 1e-12));
        assert!(!a.equals(&x2, 1e-12));
    }
}
