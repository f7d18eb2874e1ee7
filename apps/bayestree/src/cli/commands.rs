//! # CLI Command Implementations
//!
//! Each command builds the Bayes tree for the model and returns a report.

use crate::error::AppError;
use crate::model::Model;
use crate::report::{CheckReport, CliqueReport, JointEntry, JointReport, MarginalReport, TreeReport};
use bayestree_core::{Conditional, Key};

fn names(model: &Model, keys: &[Key]) -> Vec<String> {
    keys.iter().map(|k| model.name(*k)).collect()
}

// =============================================================================
// TREE COMMAND
// =============================================================================

/// Describe every clique of the tree.
pub fn cmd_tree(model: &Model) -> Result<TreeReport, AppError> {
    let tree = model.build_tree()?;
    let cliques = tree
        .cliques()
        .map(|clique| CliqueReport {
            id: clique.id().0,
            frontals: names(model, clique.frontals()),
            separator: names(model, clique.separator()),
            parent: clique.parent().map(|p| p.0),
            children: clique.children().iter().map(|c| c.0).collect(),
        })
        .collect();

    Ok(TreeReport {
        size: tree.size(),
        roots: tree.roots().map(|r| r.id().0).collect(),
        cliques,
    })
}

// =============================================================================
// MARGINAL COMMAND
// =============================================================================

/// Marginal of a single variable.
pub fn cmd_marginal(model: &Model, variable: &str) -> Result<MarginalReport, AppError> {
    let key = model.key(variable)?;
    let tree = model.build_tree()?;
    let marginal = tree.marginal(key)?;
    tracing::debug!(variable, "computed marginal");

    Ok(MarginalReport {
        variable: variable.to_string(),
        probabilities: marginal.probabilities(),
    })
}

// =============================================================================
// JOINT COMMAND
// =============================================================================

/// Joint distribution over several variables, one entry per assignment.
pub fn cmd_joint(model: &Model, variables: &[String]) -> Result<JointReport, AppError> {
    let keys = variables
        .iter()
        .map(|v| model.key(v))
        .collect::<Result<Vec<_>, _>>()?;
    let tree = model.build_tree()?;
    let joint = tree.joint(&keys)?;

    let mut entries = Vec::new();
    for assignment in joint.all_assignments() {
        let probability = joint.evaluate(&assignment)?;
        entries.push(JointEntry {
            assignment: assignment
                .iter()
                .map(|(key, value)| (model.name(*key), *value))
                .collect(),
            probability,
        });
    }

    Ok(JointReport {
        variables: names(model, joint.frontals()),
        entries,
    })
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Build the tree and verify its invariants.
pub fn cmd_check(model: &Model) -> Result<CheckReport, AppError> {
    let graph = model.factor_graph()?;
    let tree = model.build_tree()?;
    tree.validate()?;

    Ok(CheckReport {
        variables: model.variables.len(),
        factors: graph.len(),
        cliques: tree.clique_count(),
        roots: tree.roots().count(),
        valid: true,
    })
}
