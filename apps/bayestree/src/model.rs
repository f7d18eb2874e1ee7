//! # Model Files
//!
//! A discrete model is a TOML document listing variables, factor tables and
//! signature conditionals, plus an optional elimination ordering:
//!
//! ```toml
//! ordering = ["rain", "wet"]
//!
//! [[variables]]
//! name = "rain"
//! cardinality = 2
//!
//! [[factors]]
//! keys = ["rain"]
//! values = [0.8, 0.2]
//!
//! [[conditionals]]
//! variable = "wet"
//! parents = ["rain"]
//! signature = "9/1 2/8"
//! ```
//!
//! Variable names map to keys by declaration index.

use crate::error::AppError;
use bayestree_core::{
    BayesTree, DiscreteFactorGraph, DiscreteKey, Key, TableConditional, TableFactor,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Maximum model file size (16 MB).
const MAX_MODEL_FILE_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// MODEL SCHEMA
// =============================================================================

/// A discrete variable declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableSpec {
    pub name: String,
    pub cardinality: usize,
}

/// A factor table over named variables, first variable most significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorSpec {
    pub keys: Vec<String>,
    pub values: Vec<f64>,
}

/// A conditional given as a signature string such as `"9/1 2/8"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionalSpec {
    pub variable: String,
    #[serde(default)]
    pub parents: Vec<String>,
    pub signature: String,
}

/// A parsed model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Model {
    #[serde(default)]
    pub ordering: Option<Vec<String>>,
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub factors: Vec<FactorSpec>,
    #[serde(default)]
    pub conditionals: Vec<ConditionalSpec>,
}

// =============================================================================
// LOADING & VALIDATION
// =============================================================================

impl Model {
    /// Parse and validate a model from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let model: Self = toml::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    /// Read, parse and validate a model file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(AppError::InvalidModel(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > MAX_MODEL_FILE_SIZE {
            return Err(AppError::InvalidModel(format!(
                "file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_MODEL_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded model file");
        Self::from_toml_str(&text)
    }

    /// Check names, cardinalities, table shapes and the ordering.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut names = BTreeSet::new();
        for variable in &self.variables {
            if variable.name.is_empty() {
                return Err(AppError::InvalidModel("empty variable name".to_string()));
            }
            if !names.insert(variable.name.as_str()) {
                return Err(AppError::InvalidModel(format!(
                    "variable '{}' declared twice",
                    variable.name
                )));
            }
            if variable.cardinality == 0 {
                return Err(AppError::InvalidModel(format!(
                    "variable '{}' has cardinality zero",
                    variable.name
                )));
            }
        }

        for factor in &self.factors {
            let keys = self.discrete_keys(&factor.keys)?;
            let expected = keys
                .iter()
                .try_fold(1usize, |size, dk| size.checked_mul(dk.cardinality))
                .ok_or_else(|| {
                    AppError::InvalidModel(format!(
                        "factor over [{}] is too large",
                        factor.keys.join(", ")
                    ))
                })?;
            if factor.values.len() != expected {
                return Err(AppError::InvalidModel(format!(
                    "factor over [{}] has {} values, expected {}",
                    factor.keys.join(", "),
                    factor.values.len(),
                    expected
                )));
            }
        }

        for conditional in &self.conditionals {
            self.discrete_key(&conditional.variable)?;
            self.discrete_keys(&conditional.parents)?;
        }

        let mentioned: BTreeSet<&str> = self
            .factors
            .iter()
            .flat_map(|f| f.keys.iter())
            .chain(self.conditionals.iter().map(|c| &c.variable))
            .chain(self.conditionals.iter().flat_map(|c| c.parents.iter()))
            .map(String::as_str)
            .collect();
        if let Some(unused) = names.iter().find(|n| !mentioned.contains(*n)) {
            return Err(AppError::InvalidModel(format!(
                "variable '{}' appears in no factor",
                unused
            )));
        }

        if let Some(ordering) = &self.ordering {
            let listed: BTreeSet<&str> = ordering.iter().map(String::as_str).collect();
            if listed.len() != ordering.len() || listed != names {
                return Err(AppError::InvalidModel(
                    "ordering must list every variable exactly once".to_string(),
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // NAME <-> KEY
    // =========================================================================

    /// Key of a declared variable.
    pub fn key(&self, name: &str) -> Result<Key, AppError> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(|i| Key::new(i as u64))
            .ok_or_else(|| AppError::InvalidModel(format!("unknown variable '{}'", name)))
    }

    /// Name of a key produced by [`Model::key`].
    #[must_use]
    pub fn name(&self, key: Key) -> String {
        usize::try_from(key.value())
            .ok()
            .and_then(|i| self.variables.get(i))
            .map_or_else(|| key.to_string(), |v| v.name.clone())
    }

    fn discrete_key(&self, name: &str) -> Result<DiscreteKey, AppError> {
        let key = self.key(name)?;
        let cardinality = self
            .variables
            .iter()
            .find(|v| v.name == name)
            .map_or(0, |v| v.cardinality);
        Ok(DiscreteKey::new(key, cardinality))
    }

    fn discrete_keys(&self, names: &[String]) -> Result<Vec<DiscreteKey>, AppError> {
        names.iter().map(|n| self.discrete_key(n)).collect()
    }

    // =========================================================================
    // ENGINE
    // =========================================================================

    /// Elimination ordering: the declared one, or declaration order.
    pub fn ordering(&self) -> Result<Vec<Key>, AppError> {
        match &self.ordering {
            Some(names) => names.iter().map(|n| self.key(n)).collect(),
            None => Ok((0..self.variables.len() as u64).map(Key::new).collect()),
        }
    }

    /// The model as a discrete factor graph.
    pub fn factor_graph(&self) -> Result<DiscreteFactorGraph, AppError> {
        let mut graph = DiscreteFactorGraph::new();
        for factor in &self.factors {
            graph.add(TableFactor::new(
                self.discrete_keys(&factor.keys)?,
                &factor.values,
            )?);
        }
        for conditional in &self.conditionals {
            let table = TableConditional::from_signature(
                self.discrete_key(&conditional.variable)?,
                &self.discrete_keys(&conditional.parents)?,
                &conditional.signature,
            )?;
            graph.add(table.table().clone());
        }
        Ok(graph)
    }

    /// Eliminate the model and build its Bayes tree.
    pub fn build_tree(&self) -> Result<BayesTree<TableConditional>, AppError> {
        let graph = self.factor_graph()?;
        let ordering = self.ordering()?;
        let net = graph.eliminate_sequential(&ordering)?;
        let tree = BayesTree::construct(&net)?;
        tracing::info!(
            variables = self.variables.len(),
            factors = graph.len(),
            cliques = tree.clique_count(),
            "built bayes tree"
        );
        Ok(tree)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SPRINKLER: &str = r#"
        [[variables]]
        name = "wet"
        cardinality = 2

        [[variables]]
        name = "rain"
        cardinality = 2

        [[factors]]
        keys = ["rain"]
        values = [0.8, 0.2]

        [[conditionals]]
        variable = "wet"
        parents = ["rain"]
        signature = "9/1 2/8"
    "#;

    #[test]
    fn parses_and_maps_names() {
        let model = Model::from_toml_str(SPRINKLER).expect("model");
        assert_eq!(model.key("rain").expect("rain"), Key::new(1));
        assert_eq!(model.name(Key::new(0)), "wet");
        assert_eq!(model.name(Key::new(9)), "9");
        assert_eq!(model.ordering().expect("ordering"), vec![Key::new(0), Key::new(1)]);
    }

    #[test]
    fn builds_tree() {
        let model = Model::from_toml_str(SPRINKLER).expect("model");
        let tree = model.build_tree().expect("tree");
        assert_eq!(tree.size(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_variable() {
        let text = r#"
            [[variables]]
            name = "a"
            cardinality = 2

            [[factors]]
            keys = ["b"]
            values = [1.0, 1.0]
        "#;
        assert!(matches!(
            Model::from_toml_str(text),
            Err(AppError::InvalidModel(_))
        ));
    }

    #[test]
    fn rejects_wrong_table_length() {
        let text = r#"
            [[variables]]
            name = "a"
            cardinality = 3

            [[factors]]
            keys = ["a"]
            values = [1.0, 1.0]
        "#;
        assert!(Model::from_toml_str(text).is_err());
    }

    #[test]
    fn rejects_overflowing_table_size() {
        let text = r#"
            [[variables]]
            name = "a"
            cardinality = 4294967296

            [[variables]]
            name = "b"
            cardinality = 4294967296

            [[factors]]
            keys = ["a", "b"]
            values = []
        "#;
        assert!(matches!(
            Model::from_toml_str(text),
            Err(AppError::InvalidModel(_))
        ));
    }

    #[test]
    fn rejects_incomplete_ordering() {
        let text = r#"
            ordering = ["a"]

            [[variables]]
            name = "a"
            cardinality = 2

            [[variables]]
            name = "b"
            cardinality = 2
        "#;
        assert!(Model::from_toml_str(text).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        let text = r#"
            [[variables]]
            name = "a"
            cardinality = 2
            colour = "red"
        "#;
        assert!(matches!(
            Model::from_toml_str(text),
            Err(AppError::Parse(_))
        ));
    }
}
