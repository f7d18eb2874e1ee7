//! # Bayestree
//!
//! The main binary for the Bayes tree engine.
//!
//! ## Usage
//!
//! ```bash
//! # Clique structure of a model
//! bayestree --model asia.toml tree
//!
//! # Queries
//! bayestree --model asia.toml marginal dyspnea
//! bayestree --model asia.toml --json joint smoker cancer
//! ```

use bayestree::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. BAYESTREE_LOG_FORMAT=json selects JSON lines.
    let log_format = std::env::var("BAYESTREE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "bayestree=debug,bayestree_core=debug"
    } else {
        "bayestree=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    match cli::execute(cli) {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
