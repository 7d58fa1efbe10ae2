//! Artifact and metadata persistence

pub mod artifact;
pub mod metadata;

pub use artifact::{artifact_path, load_pipeline, metadata_path, save_pipeline};
pub use metadata::{persist_run, TrainingReport};
