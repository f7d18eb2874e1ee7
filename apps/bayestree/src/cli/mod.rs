//! # Bayestree CLI Module
//!
//! This module implements the CLI interface for bayestree.
//!
//! ## Available Commands
//!
//! - `tree` - Show the clique structure
//! - `marginal` - Marginal distribution of one variable
//! - `joint` - Joint distribution of several variables
//! - `check` - Validate the model and the tree invariants

mod commands;

use crate::error::AppError;
use crate::model::Model;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Bayestree - clique trees for discrete factor graphs
///
/// Eliminates the model in the given ordering, builds the Bayes tree and
/// answers marginal and joint queries from it.
#[derive(Parser, Debug)]
#[command(name = "bayestree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML model
    #[arg(short, long, global = true, default_value = "model.toml")]
    pub model: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the clique structure
    Tree,

    /// Marginal distribution of one variable
    Marginal {
        /// Variable name
        variable: String,
    },

    /// Joint distribution of several variables
    Joint {
        /// Variable names
        #[arg(required = true, num_args = 1..)]
        variables: Vec<String>,
    },

    /// Validate the model and the tree invariants
    Check,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and return the rendered output.
pub fn execute(cli: Cli) -> Result<String, AppError> {
    let model = Model::load(&cli.model)?;
    let json = cli.json;

    match cli.command {
        Some(Commands::Tree) => render(&cmd_tree(&model)?, json),
        Some(Commands::Marginal { variable }) => render(&cmd_marginal(&model, &variable)?, json),
        Some(Commands::Joint { variables }) => render(&cmd_joint(&model, &variables)?, json),
        Some(Commands::Check) => render(&cmd_check(&model)?, json),
        None => {
            // No subcommand - show the tree by default
            render(&cmd_tree(&model)?, json)
        }
    }
}

/// Render a report as text or pretty JSON.
pub fn render<R: Serialize + Display>(report: &R, json: bool) -> Result<String, AppError> {
    if json {
        Ok(serde_json::to_string_pretty(report)?)
    } else {
        Ok(report.to_string())
    }
}
