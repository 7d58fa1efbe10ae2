//! End-to-end training pipeline
//!
//! Fits the preprocessing transforms and the forest on a stratified train
//! split, evaluates on the held-out split, and hands back the fitted
//! pipeline together with its evaluation and dataset statistics. The fitted
//! pipeline is the unit the artifact writer serializes and the serving
//! collaborator loads.

use std::time::Instant;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data::loader::Dataset;
use crate::data::plan::FeaturePlan;
use crate::data::schema::NeedLevel;
use crate::error::{Error, Result};
use crate::eval::classification::{
    per_class_accuracy_by_label, ConfusionMatrix, WeightedMetrics,
};
use crate::train::encoder::{OneHotEncoder, StandardScaler};
use crate::train::forest::{balanced_class_weights, ForestParams, RandomForest};
use crate::train::split::{stratified_split, Split};

/// Caller-facing training hyperparameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrainParams {
    pub test_size: f64,
    pub random_state: u64,
    pub n_estimators: usize,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            n_estimators: 200,
        }
    }
}

/// The fitted preprocessing + classifier pipeline.
///
/// Serialized as one opaque artifact; the serving side loads it once at
/// startup and injects it into request handlers as an explicit handle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillModelPipeline {
    pub version: String,
    pub plan: FeaturePlan,
    encoder: OneHotEncoder,
    scaler: StandardScaler,
    forest: RandomForest,
}

impl SkillModelPipeline {
    /// Learned class labels in canonical order.
    pub fn classes(&self) -> Vec<String> {
        NeedLevel::class_names()
    }

    /// Expanded (post-encoding) feature names, parallel to the forest's
    /// importance vector.
    pub fn expanded_feature_names(&self) -> Vec<String> {
        let mut names = self.encoder.feature_names();
        names.extend(self.plan.numeric.iter().cloned());
        names
    }

    /// Predict the demand level for one observation.
    ///
    /// `categorical` and `numeric` are parallel to the plan's partitions.
    /// Category values never seen at fit time encode to all-zero and the
    /// prediction proceeds.
    pub fn predict_row(&self, categorical: &[&str], numeric: &[f64]) -> Result<NeedLevel> {
        if categorical.len() != self.plan.categorical.len() {
            return Err(Error::PredictionInput {
                kind: "categorical",
                expected: self.plan.categorical.len(),
                got: categorical.len(),
            });
        }
        if numeric.len() != self.plan.numeric.len() {
            return Err(Error::PredictionInput {
                kind: "numeric",
                expected: self.plan.numeric.len(),
                got: numeric.len(),
            });
        }

        let width = self.encoder.width() + numeric.len();
        let mut row = Array1::<f64>::zeros(width);
        {
            let slice = row
                .as_slice_mut()
                .ok_or_else(|| Error::Serialization("non-contiguous row buffer".to_string()))?;
            self.encoder.encode_row(categorical, &mut slice[..self.encoder.width()]);
            for (c, &value) in numeric.iter().enumerate() {
                slice[self.encoder.width() + c] = self.scaler.transform(c, value);
            }
        }
        let class = self.forest.predict(row.view());
        Ok(NeedLevel::ALL[class])
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

/// Held-out evaluation of one training run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub precision_weighted: f64,
    pub recall_weighted: f64,
    pub f1_weighted: f64,
    /// Per-class accuracy in canonical label order; zero-support classes
    /// are absent.
    pub per_class: Vec<(String, f64)>,
}

/// Everything a training run produces, before any of it is persisted.
#[derive(Clone, Debug)]
pub struct TrainOutcome {
    pub pipeline: SkillModelPipeline,
    pub evaluation: Evaluation,
    /// Top expanded features by importance, descending; empty when the
    /// importance vector could not be aligned to the expanded names.
    pub feature_importance: Vec<(String, f64)>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub duration_seconds: f64,
}

/// Fit and evaluate one versioned model.
///
/// Validation errors (`InvalidTestSize`, `InvalidTreeCount`,
/// `InsufficientClassSamples`) surface directly before any fitting work;
/// failures inside matrix building, fitting, or evaluation come back as
/// [`Error::TrainingFailed`] with the cause attached.
pub fn train(
    dataset: &Dataset,
    plan: &FeaturePlan,
    params: &TrainParams,
    version: &str,
) -> Result<TrainOutcome> {
    if params.n_estimators == 0 {
        return Err(Error::InvalidTreeCount(0));
    }

    let started = Instant::now();
    let split = stratified_split(dataset.labels(), params.test_size, params.random_state)?;

    let outcome = fit_and_evaluate(dataset, plan, params, version, &split)
        .map_err(Error::into_training_failure)?;

    Ok(TrainOutcome {
        duration_seconds: started.elapsed().as_secs_f64(),
        ..outcome
    })
}

fn fit_and_evaluate(
    dataset: &Dataset,
    plan: &FeaturePlan,
    params: &TrainParams,
    version: &str,
    split: &Split,
) -> Result<TrainOutcome> {
    let n_classes = NeedLevel::ALL.len();

    let cat_values: Vec<Vec<&str>> = plan
        .categorical
        .iter()
        .map(|name| {
            dataset
                .column_values(name)
                .ok_or_else(|| Error::SchemaMismatch {
                    column: name.clone(),
                    row: 0,
                    value: "<column absent>".to_string(),
                })
        })
        .collect::<Result<_>>()?;
    let num_values: Vec<Vec<f64>> = plan
        .numeric
        .iter()
        .map(|name| dataset.numeric_column(name))
        .collect::<Result<_>>()?;

    let encoder = OneHotEncoder::fit(&plan.categorical, &cat_values, &split.train);
    let scaler = StandardScaler::fit(&plan.numeric, &num_values, &split.train);

    let build_matrix = |rows: &[usize]| -> Array2<f64> {
        let enc_width = encoder.width();
        let width = enc_width + num_values.len();
        let mut x = Array2::<f64>::zeros((rows.len(), width));
        let mut raw = Vec::with_capacity(cat_values.len());
        let mut encoded = vec![0.0; enc_width];
        for (out_row, &i) in rows.iter().enumerate() {
            raw.clear();
            raw.extend(cat_values.iter().map(|col| col[i]));
            encoder.encode_row(&raw, &mut encoded);
            for (c, &v) in encoded.iter().enumerate() {
                x[[out_row, c]] = v;
            }
            for (c, col) in num_values.iter().enumerate() {
                x[[out_row, enc_width + c]] = scaler.transform(c, col[i]);
            }
        }
        x
    };

    let x_train = build_matrix(&split.train);
    let x_test = build_matrix(&split.test);
    let y_train: Vec<usize> = split.train.iter().map(|&i| dataset.labels()[i].index()).collect();
    let y_test: Vec<usize> = split.test.iter().map(|&i| dataset.labels()[i].index()).collect();

    let class_weights = balanced_class_weights(&y_train, n_classes);
    let forest = RandomForest::fit(
        &x_train,
        &y_train,
        n_classes,
        &class_weights,
        ForestParams {
            n_trees: params.n_estimators,
            seed: params.random_state,
            ..ForestParams::default()
        },
    );

    let y_pred: Vec<usize> = (0..x_test.nrows()).map(|i| forest.predict(x_test.row(i))).collect();
    let cm = ConfusionMatrix::from_predictions(&y_test, &y_pred, n_classes);
    let weighted = WeightedMetrics::from_confusion_matrix(&cm);

    let evaluation = Evaluation {
        accuracy: cm.accuracy(),
        precision_weighted: weighted.precision,
        recall_weighted: weighted.recall,
        f1_weighted: weighted.f1,
        per_class: per_class_accuracy_by_label(&cm),
    };

    let pipeline = SkillModelPipeline {
        version: version.to_string(),
        plan: plan.clone(),
        encoder,
        scaler,
        forest,
    };

    let names = pipeline.expanded_feature_names();
    let importances = pipeline.forest.feature_importances();
    let feature_importance = if names.len() == importances.len() {
        let mut pairs: Vec<(String, f64)> = names.into_iter().zip(importances.iter().copied()).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs.truncate(10);
        pairs
    } else {
        Vec::new()
    };

    Ok(TrainOutcome {
        pipeline,
        evaluation,
        feature_importance,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
        duration_seconds: 0.0,
    })
}
