//! CLI module for prever
//!
//! Argument parsing, command handlers, and output utilities.

pub mod args;
mod commands;
pub mod logging;

pub use args::{parse_args, Cli, Command, RetrainArgs, TrainArgs};
pub use commands::run_command;
pub use logging::LogLevel;
