//! # Gaussian Factor Graphs
//!
//! Linear-Gaussian measurement factors and sequential elimination into a
//! Bayes net of `GaussianConditional`s.

use super::conditional::GaussianConditional;
use super::information::InformationForm;
use crate::conditional::BayesNet;
use crate::types::{BayesTreeError, Key};
use ndarray::{Array1, Array2};
use std::collections::{BTreeMap, BTreeSet};

/// A linear measurement `Σ_k A_k x_k = b` with independent row noise.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianFactor {
    info: InformationForm,
}

impl GaussianFactor {
    /// Create a factor from Jacobian blocks, right-hand side and sigmas.
    pub fn new(
        blocks: &[(Key, Array2<f64>)],
        rhs: &Array1<f64>,
        sigmas: &Array1<f64>,
    ) -> Result<Self, BayesTreeError> {
        Ok(Self {
            info: InformationForm::from_measurement(blocks, rhs, sigmas)?,
        })
    }

    /// Keys in block order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        self.info.keys()
    }

    /// Variable dimensions.
    #[must_use]
    pub fn dims(&self) -> &BTreeMap<Key, usize> {
        self.info.dims()
    }
}

/// Collection of Gaussian factors.
#[derive(Debug, Clone, Default)]
pub struct GaussianFactorGraph {
    factors: Vec<GaussianFactor>,
}

impl GaussianFactorGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, factor: GaussianFactor) {
        self.factors.push(factor);
    }

    /// Direct measurement `x = mean` with isotropic noise `sigma`.
    pub fn add_prior(&mut self, key: Key, mean: Array1<f64>, sigma: f64) -> Result<(), BayesTreeError> {
        let dim = mean.len();
        self.add(GaussianFactor::new(
            &[(key, Array2::eye(dim))],
            &mean,
            &Array1::from_elem(dim, sigma),
        )?);
        Ok(())
    }

    /// Relative measurement `to - from = delta` with isotropic noise `sigma`.
    pub fn add_between(
        &mut self,
        from: Key,
        to: Key,
        delta: Array1<f64>,
        sigma: f64,
    ) -> Result<(), BayesTreeError> {
        let dim = delta.len();
        self.add(GaussianFactor::new(
            &[(from, -Array2::eye(dim)), (to, Array2::eye(dim))],
            &delta,
            &Array1::from_elem(dim, sigma),
        )?);
        Ok(())
    }

    #[must_use]
    pub fn factors(&self) -> &[GaussianFactor] {
        &self.factors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Every key mentioned by some factor.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<Key> {
        self.factors
            .iter()
            .flat_map(|f| f.keys().iter().copied())
            .collect()
    }

    /// Eliminate variables in `ordering` into a Bayes net in the same order.
    ///
    /// Each step sums the factors on the key, integrates the key out to
    /// get the new factor on its neighbours, and keeps the difference as
    /// the conditional. Parents are listed in elimination order.
    pub fn eliminate_sequential(
        &self,
        ordering: &[Key],
    ) -> Result<BayesNet<GaussianConditional>, BayesTreeError> {
        let position: BTreeMap<Key, usize> =
            ordering.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        if let Some(&key) = self.keys().iter().find(|k| !position.contains_key(k)) {
            return Err(BayesTreeError::InvalidElimination {
                key,
                reason: "key is missing from the elimination ordering".to_string(),
            });
        }

        let mut factors: Vec<InformationForm> =
            self.factors.iter().map(|f| f.info.clone()).collect();
        let mut net = BayesNet::new();
        for &key in ordering {
            let (involved, rest): (Vec<_>, Vec<_>) = factors
                .into_iter()
                .partition(|f| f.keys().contains(&key));
            factors = rest;
            if involved.is_empty() {
                return Err(BayesTreeError::KeyNotFound(key));
            }

            let mut separator: Vec<Key> = involved
                .iter()
                .flat_map(|f| f.keys().iter().copied())
                .filter(|&k| k != key)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            separator.sort_by_key(|k| position.get(k).copied().unwrap_or(usize::MAX));
            let order: Vec<Key> = std::iter::once(key).chain(separator.iter().copied()).collect();

            let joint = InformationForm::sum(&involved, &order)?;
            let marginal = joint.marginalize(&[key])?;
            let mut conditional = joint;
            conditional.scatter(&marginal, -1.0)?;
            tracing::trace!(key = %key, parents = separator.len(), "eliminated gaussian variable");

            net.push_back(GaussianConditional::from_information(
                vec![key],
                separator,
                conditional,
            ));
            if !marginal.keys().is_empty() {
                factors.push(marginal);
            }
        }
        Ok(net)
    }

    /// Chain of `steps` planar poses `x1..x{steps}`.
    ///
    /// Every pose has a unit-sigma prior at `(t, 0)` and consecutive poses
    /// are linked by unit-sigma odometry `(1, 0)`, so the mean of `x{t}`
    /// is `(t, 0)`.
    pub fn smoother(steps: u64) -> Result<Self, BayesTreeError> {
        let mut graph = Self::new();
        for t in 1..=steps {
            graph.add_prior(Key::symbol('x', t), ndarray::array![t as f64, 0.0], 1.0)?;
            if t > 1 {
                graph.add_between(
                    Key::symbol('x', t - 1),
                    Key::symbol('x', t),
                    ndarray::array![1.0, 0.0],
                    1.0,
                )?;
            }
        }
        Ok(graph)
    }
}

// =============================================================================
// TESTS
// =============================================================================
