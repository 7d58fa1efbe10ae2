//! Training metadata record
//!
//! One JSON document per artifact, sharing the artifact's version id. The
//! class-distribution and feature-importance maps keep the descending order
//! the pipeline produced; they are never re-sorted by key.
//!
//! Durability ordering: the artifact is written first, the metadata second.
//! If the metadata write fails the artifact is removed again, so at no
//! point does exactly one of the pair exist on disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::data::loader::Dataset;
use crate::data::plan::FeaturePlan;
use crate::error::{Error, Result};
use crate::io::artifact::{metadata_path, save_pipeline};
use crate::train::pipeline::{TrainOutcome, TrainParams};

/// Dataset statistics captured alongside the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetSection {
    pub csv_path: String,
    pub csv_sha256: String,
    pub total_samples: usize,
    pub rows_dropped: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub features_used: Vec<String>,
    pub features_missing: Vec<String>,
    pub categorical_features: Vec<String>,
    pub numeric_features: Vec<String>,
    /// Label -> count, descending by count.
    pub class_distribution: Map<String, Value>,
    pub imbalance_ratio: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub n_estimators: usize,
    pub random_state: u64,
    pub test_size: f64,
    pub class_weight: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSection {
    pub accuracy: f64,
    pub precision_weighted: f64,
    pub recall_weighted: f64,
    pub f1_weighted: f64,
    /// Label -> accuracy; classes without held-out support are absent.
    pub per_class: Map<String, Value>,
}

/// The versioned metadata record written next to every artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_version: String,
    pub training_date: String,
    pub training_duration_seconds: f64,
    pub dataset: DatasetSection,
    pub hyperparameters: Hyperparameters,
    pub metrics: MetricsSection,
    /// Expanded feature name -> importance, descending.
    pub feature_importance_top10: Map<String, Value>,
    pub model_classes: Vec<String>,
}

impl TrainingReport {
    /// Assemble the record for one finished training run.
    pub fn build(
        outcome: &TrainOutcome,
        dataset: &Dataset,
        plan: &FeaturePlan,
        params: &TrainParams,
    ) -> Result<Self> {
        let csv_bytes = fs::read(dataset.source())?;
        let csv_sha256 = format!("{:x}", Sha256::digest(&csv_bytes));

        let mut class_distribution = Map::new();
        for (label, count) in dataset.class_distribution() {
            class_distribution.insert(label.as_str().to_string(), json!(count));
        }

        let mut per_class = Map::new();
        for (label, acc) in &outcome.evaluation.per_class {
            per_class.insert(label.clone(), json!(acc));
        }

        let mut feature_importance_top10 = Map::new();
        for (name, importance) in &outcome.feature_importance {
            feature_importance_top10.insert(name.clone(), json!(importance));
        }

        Ok(Self {
            model_version: outcome.pipeline.version.clone(),
            training_date: Utc::now().to_rfc3339(),
            training_duration_seconds: outcome.duration_seconds,
            dataset: DatasetSection {
                csv_path: dataset.source().display().to_string(),
                csv_sha256,
                total_samples: dataset.len(),
                rows_dropped: dataset.dropped_rows(),
                train_samples: outcome.train_samples,
                test_samples: outcome.test_samples,
                features_used: plan.used(),
                features_missing: plan.missing.clone(),
                categorical_features: plan.categorical.clone(),
                numeric_features: plan.numeric.clone(),
                class_distribution,
                imbalance_ratio: dataset.imbalance_ratio(),
            },
            hyperparameters: Hyperparameters {
                n_estimators: params.n_estimators,
                random_state: params.random_state,
                test_size: params.test_size,
                class_weight: "balanced".to_string(),
            },
            metrics: MetricsSection {
                accuracy: outcome.evaluation.accuracy,
                precision_weighted: outcome.evaluation.precision_weighted,
                recall_weighted: outcome.evaluation.recall_weighted,
                f1_weighted: outcome.evaluation.f1_weighted,
                per_class,
            },
            feature_importance_top10,
            model_classes: outcome.pipeline.classes(),
        })
    }

    /// Read a record back from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Serialization(format!("metadata decode failed: {e}")))
    }

    fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("metadata encode failed: {e}")))?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// Persist one training run: artifact first, then the metadata record.
///
/// Returns the metadata path. If the metadata write fails the artifact is
/// removed again before the error propagates.
pub fn persist_run(
    outcome: &TrainOutcome,
    report: &TrainingReport,
    artifact: &Path,
) -> Result<PathBuf> {
    save_pipeline(&outcome.pipeline, artifact)?;

    let meta = metadata_path(artifact);
    if let Err(e) = report.write(&meta) {
        let _ = fs::remove_file(artifact);
        return Err(e);
    }
    Ok(meta)
}
