//! Prever CLI
//!
//! # Usage
//!
//! ```bash
//! # Train a version from an existing dataset export
//! prever train --csv data/future_skills_dataset.csv --output models/ --version v3
//!
//! # Export, train, and register a new version
//! prever retrain --version v4 --export-command "hrctl export-dataset"
//!
//! # Retrain from an existing export and update the runtime settings
//! prever retrain --version v4 --skip-export --auto-update-settings
//! ```

use clap::Parser;
use prever::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
