//! Crate-wide error type
//!
//! Dataset and feature validation errors abort before any fitting occurs.
//! Training errors wrap their original cause. Registry and settings errors
//! are surfaced to the orchestrator, which treats them as non-fatal once the
//! artifact and metadata already exist.

use std::path::PathBuf;

/// Pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Dataset file not found: {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Model artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Label column '{0}' missing from dataset header")]
    MissingLabelColumn(String),

    #[error("No rows with a valid label remain after filtering ({dropped} dropped)")]
    NoValidRows { dropped: usize },

    #[error("Column '{column}' is declared numeric but row {row} holds '{value}'")]
    SchemaMismatch {
        column: String,
        row: usize,
        value: String,
    },

    #[error("No usable feature columns (missing from dataset: {})", .missing.join(", "))]
    NoUsableFeatures { missing: Vec<String> },

    #[error("Class '{label}' has {count} sample(s); stratified splitting requires at least 2")]
    InsufficientClassSamples { label: String, count: usize },

    #[error("Invalid test size: {0} (must be > 0.0 and < 1.0)")]
    InvalidTestSize(f64),

    #[error("Invalid tree count: {0} (must be > 0)")]
    InvalidTreeCount(usize),

    #[error("Training failed: {0}")]
    TrainingFailed(#[source] Box<Error>),

    #[error("Prediction input has {got} {kind} value(s); the pipeline expects {expected}")]
    PredictionInput {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Registry header marker not found in {}", .0.display())]
    RegistryFormat(PathBuf),

    #[error("Export command `{command}` exited with status {status}")]
    SubprocessFailed { command: String, status: i32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a fitting/evaluation error as a training failure, keeping the
    /// original cause in the source chain.
    pub fn into_training_failure(self) -> Error {
        match self {
            Error::TrainingFailed(_) => self,
            other => Error::TrainingFailed(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = Error::MissingLabelColumn("future_need_level".to_string());
        assert!(e.to_string().contains("future_need_level"));

        let e = Error::NoValidRows { dropped: 7 };
        assert!(e.to_string().contains('7'));

        let e = Error::InsufficientClassSamples {
            label: "HIGH".to_string(),
            count: 1,
        };
        assert!(e.to_string().contains("HIGH"));
        assert!(e.to_string().contains("at least 2"));
    }

    #[test]
    fn test_training_failure_wraps_cause() {
        use std::error::Error as _;

        let inner = Error::InvalidTestSize(1.5);
        let wrapped = inner.into_training_failure();
        assert!(matches!(wrapped, Error::TrainingFailed(_)));
        assert!(wrapped.source().is_some());
    }

    #[test]
    fn test_training_failure_is_not_double_wrapped() {
        let inner = Error::InvalidTestSize(1.5).into_training_failure();
        let again = inner.into_training_failure();
        match again {
            Error::TrainingFailed(cause) => {
                assert!(matches!(*cause, Error::InvalidTestSize(_)));
            }
            other => panic!("expected TrainingFailed, got {other:?}"),
        }
    }
}
