//! Retrain command implementation

use crate::cli::args::RetrainArgs;
use crate::cli::logging::{log, LogLevel};
use crate::orchestrate::{Orchestrator, RetrainPlan};
use crate::train::pipeline::TrainParams;

pub fn run_retrain(args: RetrainArgs, level: LogLevel) -> Result<(), String> {
    let export_command = if args.skip_export {
        None
    } else {
        args.export_command
            .as_deref()
            .map(|cmd| cmd.split_whitespace().map(String::from).collect())
    };

    let plan = RetrainPlan {
        version: args.version.clone(),
        csv: args.csv,
        output_dir: args.output_dir,
        registry: args.registry,
        settings: args.settings,
        auto_update_settings: args.auto_update_settings,
        export_command,
        params: TrainParams {
            test_size: args.test_size,
            random_state: args.random_state,
            n_estimators: args.n_estimators,
        },
    };

    log(
        level,
        LogLevel::Normal,
        &format!("Prever: retraining version {}", args.version),
    );

    let mut orchestrator = Orchestrator::new(plan);
    match orchestrator.run(level) {
        Ok(report) => {
            log(
                level,
                LogLevel::Normal,
                &format!(
                    "Retrain complete: accuracy {:.3}, weighted F1 {:.3}, {} samples",
                    report.accuracy, report.f1_weighted, report.samples
                ),
            );
            if !report.warnings.is_empty() {
                log(
                    level,
                    LogLevel::Normal,
                    &format!(
                        "Completed with {} bookkeeping warning(s); artifact at {}",
                        report.warnings.len(),
                        report.artifact.display()
                    ),
                );
            }
            Ok(())
        }
        Err(e) => {
            let stage = orchestrator
                .failed_from()
                .map_or_else(|| "unknown".to_string(), |s| s.to_string());
            Err(format!("retrain failed during {stage}: {e}"))
        }
    }
}
