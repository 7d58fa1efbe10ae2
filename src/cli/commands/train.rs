//! Train command implementation

use crate::cli::args::TrainArgs;
use crate::cli::logging::{log, LogLevel};
use crate::data::loader::Dataset;
use crate::data::plan::FeaturePlan;
use crate::data::schema::FEATURE_SCHEMA;
use crate::io::artifact::artifact_path;
use crate::io::metadata::{persist_run, TrainingReport};
use crate::train::pipeline::{train, TrainParams};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Prever: loading dataset from {}", args.csv.display()),
    );
    let dataset = Dataset::load(&args.csv).map_err(|e| e.to_string())?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  {} rows retained, {} dropped",
            dataset.len(),
            dataset.dropped_rows()
        ),
    );

    let plan = FeaturePlan::build(&dataset, FEATURE_SCHEMA).map_err(|e| e.to_string())?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Features: {} categorical, {} numeric ({} declared but missing)",
            plan.categorical.len(),
            plan.numeric.len(),
            plan.missing.len()
        ),
    );
    for name in &plan.missing {
        log(level, LogLevel::Verbose, &format!("  missing: {name}"));
    }

    let params = TrainParams {
        test_size: args.test_size,
        random_state: args.random_state,
        n_estimators: args.n_estimators,
    };
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training {} trees (seed {}, test size {})",
            params.n_estimators, params.random_state, params.test_size
        ),
    );
    let outcome = train(&dataset, &plan, &params, &args.version).map_err(|e| e.to_string())?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Evaluation: accuracy {:.3}, weighted F1 {:.3} ({} train / {} test)",
            outcome.evaluation.accuracy,
            outcome.evaluation.f1_weighted,
            outcome.train_samples,
            outcome.test_samples
        ),
    );
    for (label, acc) in &outcome.evaluation.per_class {
        log(level, LogLevel::Verbose, &format!("  {label}: {acc:.3}"));
    }

    let report =
        TrainingReport::build(&outcome, &dataset, &plan, &params).map_err(|e| e.to_string())?;
    let artifact = artifact_path(&args.output, &args.version);
    let metadata = persist_run(&outcome, &report, &artifact).map_err(|e| e.to_string())?;

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Saved artifact {} with metadata {}",
            artifact.display(),
            metadata.display()
        ),
    );
    Ok(())
}
