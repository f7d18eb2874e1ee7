//! Unit tests for report serialization and text rendering.

use bayestree::cli::render;
use bayestree::report::{CliqueReport, JointEntry, JointReport, MarginalReport, TreeReport};
use std::collections::BTreeMap;

// =============================================================================
// TREE REPORT
// =============================================================================

fn chain_report() -> TreeReport {
    TreeReport {
        size: 3,
        roots: vec![0],
        cliques: vec![
            CliqueReport {
                id: 0,
                frontals: vec!["b".to_string(), "c".to_string()],
                separator: Vec::new(),
                parent: None,
                children: vec![1],
            },
            CliqueReport {
                id: 1,
                frontals: vec!["a".to_string()],
                separator: vec!["b".to_string()],
                parent: Some(0),
                children: Vec::new(),
            },
        ],
    }
}

#[test]
fn tree_report_text_indents_children() {
    let text = chain_report().to_string();
    assert!(text.contains("\nb c\n"));
    assert!(text.contains("\n  a : b\n"));
}

#[test]
fn deep_tree_report_prints_every_clique() {
    let depth = 2_000;
    let cliques = (0..depth)
        .map(|id| CliqueReport {
            id,
            frontals: vec![format!("x{}", id)],
            separator: if id == 0 { Vec::new() } else { vec![format!("x{}", id - 1)] },
            parent: id.checked_sub(1),
            children: if id + 1 < depth { vec![id + 1] } else { Vec::new() },
        })
        .collect();
    let report = TreeReport {
        size: depth,
        roots: vec![0],
        cliques,
    };

    let text = report.to_string();
    assert_eq!(text.lines().count(), 5 + depth);
    assert!(text.ends_with(&format!("x{} : x{}\n", depth - 1, depth - 2)));
}

#[test]
fn tree_report_json_roundtrip() {
    let report = chain_report();
    let json = render(&report, true).expect("json");
    assert!(json.contains("\"separator\""));
    let back: TreeReport = serde_json::from_str(&json).expect("parse");
    assert_eq!(back, report);
}

// =============================================================================
// DISTRIBUTION REPORTS
// =============================================================================

#[test]
fn marginal_report_serialization() {
    let report = MarginalReport {
        variable: "rain".to_string(),
        probabilities: vec![0.75, 0.25],
    };
    let json = serde_json::to_string(&report).expect("json");
    assert_eq!(json, r#"{"variable":"rain","probabilities":[0.75,0.25]}"#);
}

#[test]
fn joint_report_text_lists_assignments() {
    let assignment: BTreeMap<String, usize> =
        [("a".to_string(), 1), ("b".to_string(), 0)].into_iter().collect();
    let report = JointReport {
        variables: vec!["b".to_string(), "a".to_string()],
        entries: vec![JointEntry {
            assignment,
            probability: 0.125,
        }],
    };
    let text = render(&report, false).expect("text");
    assert!(text.contains("P(b, a)"));
    assert!(text.contains("b=0 a=1: 0.125000"));
}
