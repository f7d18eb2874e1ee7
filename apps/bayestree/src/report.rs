//! # Command Reports
//!
//! Serializable results of the CLI commands. Each report prints as plain
//! text or, with `--json`, as pretty JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// TREE REPORT
// =============================================================================

/// One clique of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliqueReport {
    pub id: usize,
    pub frontals: Vec<String>,
    pub separator: Vec<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Shape of the whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeReport {
    pub size: usize,
    pub roots: Vec<usize>,
    pub cliques: Vec<CliqueReport>,
}

impl fmt::Display for TreeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bayes Tree")?;
        writeln!(f, "==========")?;
        writeln!(f, "Variables: {}", self.size)?;
        writeln!(f, "Cliques:   {}", self.cliques.len())?;
        writeln!(f)?;

        let by_id: BTreeMap<usize, &CliqueReport> =
            self.cliques.iter().map(|c| (c.id, c)).collect();
        // Depth-first, children in listed order.
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(clique) = by_id.get(&id) else {
                continue;
            };
            write!(f, "{}{}", "  ".repeat(depth), clique.frontals.join(" "))?;
            if !clique.separator.is_empty() {
                write!(f, " : {}", clique.separator.join(" "))?;
            }
            writeln!(f)?;
            stack.extend(clique.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        Ok(())
    }
}

// =============================================================================
// MARGINAL REPORT
// =============================================================================

/// Marginal distribution of one variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginalReport {
    pub variable: String,
    pub probabilities: Vec<f64>,
}

impl fmt::Display for MarginalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "P({})", self.variable)?;
        for (value, p) in self.probabilities.iter().enumerate() {
            writeln!(f, "  {} = {}: {:.6}", self.variable, value, p)?;
        }
        Ok(())
    }
}

// =============================================================================
// JOINT REPORT
// =============================================================================

/// One row of a joint table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointEntry {
    pub assignment: BTreeMap<String, usize>,
    pub probability: f64,
}

/// Joint distribution over several variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointReport {
    pub variables: Vec<String>,
    pub entries: Vec<JointEntry>,
}

impl fmt::Display for JointReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "P({})", self.variables.join(", "))?;
        for entry in &self.entries {
            let values: Vec<String> = self
                .variables
                .iter()
                .map(|v| {
                    let value = entry.assignment.get(v).copied().unwrap_or_default();
                    format!("{}={}", v, value)
                })
                .collect();
            writeln!(f, "  {}: {:.6}", values.join(" "), entry.probability)?;
        }
        Ok(())
    }
}

// =============================================================================
// CHECK REPORT
// =============================================================================

/// Outcome of model and tree validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub variables: usize,
    pub factors: usize,
    pub cliques: usize,
    pub roots: usize,
    pub valid: bool,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model Check")?;
        writeln!(f, "===========")?;
        writeln!(f, "Variables: {}", self.variables)?;
        writeln!(f, "Factors:   {}", self.factors)?;
        writeln!(f, "Cliques:   {}", self.cliques)?;
        writeln!(f, "Roots:     {}", self.roots)?;
        writeln!(f, "Valid:     {}", if self.valid { "yes" } else { "no" })
    }
}
