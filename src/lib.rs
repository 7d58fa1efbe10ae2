//! Prever: future skill-demand model training & versioning
//!
//! An offline pipeline that turns an exported HR skill-demand dataset into a
//! versioned, evaluated classification model:
//!
//! 1. [`data`] loads and validates the CSV export and plans the feature
//!    columns against a declared schema.
//! 2. [`train`] fits one-hot + standardization preprocessing and a
//!    class-balanced random forest on a stratified split, evaluating on the
//!    held-out partition.
//! 3. [`io`] serializes the fitted pipeline as an opaque artifact with a
//!    sibling JSON metadata record (artifact first, always).
//! 4. [`registry`] keeps the append-only Markdown ledger of trained
//!    versions, and [`settings`] holds the typed runtime pointer the
//!    serving side reads.
//! 5. [`orchestrate`] sequences export -> train -> register for the
//!    `retrain` subcommand.
//!
//! # Example
//!
//! ```no_run
//! use prever::data::{Dataset, FeaturePlan, FEATURE_SCHEMA};
//! use prever::train::{train, TrainParams};
//! use std::path::Path;
//!
//! # fn main() -> prever::Result<()> {
//! let dataset = Dataset::load(Path::new("data/future_skills_dataset.csv"))?;
//! let plan = FeaturePlan::build(&dataset, FEATURE_SCHEMA)?;
//! let outcome = train(&dataset, &plan, &TrainParams::default(), "v3")?;
//! println!("accuracy {:.3}", outcome.evaluation.accuracy);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod eval;
pub mod io;
pub mod orchestrate;
pub mod registry;
pub mod settings;
pub mod train;

pub use error::{Error, Result};
