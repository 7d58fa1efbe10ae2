//! CLI argument parsing
//!
//! ```bash
//! prever train --csv data/future_skills_dataset.csv --output models/ --version v3
//! prever retrain --version v4 --export-command "hrctl export-dataset"
//! prever retrain --version v4 --skip-export --auto-update-settings
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prever: future skill-demand model training & versioning
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "prever")]
#[command(version)]
#[command(about = "Train, version, and register future skill-demand models")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train one model version from an existing dataset export
    Train(TrainArgs),

    /// Export, train, and register a new model version
    Retrain(RetrainArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to the exported dataset CSV
    #[arg(long, value_name = "PATH")]
    pub csv: PathBuf,

    /// Directory the artifact and metadata are written into
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Version tag embedded in the artifact and metadata
    #[arg(long, value_name = "TAG")]
    pub version: String,

    /// Held-out fraction for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Random seed for splitting and tree fitting
    #[arg(long, default_value_t = 42)]
    pub random_state: u64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 200)]
    pub n_estimators: usize,
}

/// Arguments for the retrain command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RetrainArgs {
    /// Version tag for the new model
    #[arg(long, value_name = "TAG")]
    pub version: String,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 200)]
    pub n_estimators: usize,

    /// Held-out fraction for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_size: f64,

    /// Random seed for splitting and tree fitting
    #[arg(long, default_value_t = 42)]
    pub random_state: u64,

    /// Point the runtime settings at the new version after registering
    #[arg(long)]
    pub auto_update_settings: bool,

    /// Skip the export stage; the dataset CSV must already exist
    #[arg(long)]
    pub skip_export: bool,

    /// Dataset-export command, run as a subprocess (split on whitespace)
    #[arg(long, value_name = "CMD", required_unless_present = "skip_export")]
    pub export_command: Option<String>,

    /// Dataset location the export writes and training reads
    #[arg(long, value_name = "PATH", default_value = "data/future_skills_dataset.csv")]
    pub csv: PathBuf,

    /// Directory the artifact and metadata are written into
    #[arg(long, value_name = "DIR", default_value = "models")]
    pub output_dir: PathBuf,

    /// Model registry ledger
    #[arg(long, value_name = "PATH", default_value = "MODEL_REGISTRY.md")]
    pub registry: PathBuf,

    /// Runtime settings store
    #[arg(long, value_name = "PATH", default_value = "runtime_settings.json")]
    pub settings: PathBuf,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
