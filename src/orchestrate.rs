//! Retrain orchestration
//!
//! Drives one end-to-end retrain as a small state machine:
//! `Exporting -> Training -> Registering -> Done`, with `Failed` terminal
//! from the first two stages. Exporting shells out to the dataset-export
//! command and gates on its exit status. Training runs in-process through
//! the same code path as the `train` subcommand. Registering performs the
//! bookkeeping writes; once artifact and metadata exist, its failures are
//! collected as warnings instead of failing the run.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use chrono::Utc;

use crate::cli::logging::{log, LogLevel};
use crate::data::loader::Dataset;
use crate::data::plan::FeaturePlan;
use crate::data::schema::FEATURE_SCHEMA;
use crate::error::{Error, Result};
use crate::io::artifact::artifact_path;
use crate::io::metadata::{persist_run, TrainingReport};
use crate::registry::{append_entry, RegistryEntry};
use crate::settings::update_runtime_settings;
use crate::train::pipeline::{train, TrainParams};

/// Orchestrator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Exporting,
    Training,
    Registering,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Exporting => "exporting",
            Stage::Training => "training",
            Stage::Registering => "registering",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything one retrain run needs to know up front.
#[derive(Clone, Debug)]
pub struct RetrainPlan {
    pub version: String,
    /// Dataset location; the export command is expected to (re)write it.
    pub csv: PathBuf,
    pub output_dir: PathBuf,
    pub registry: PathBuf,
    pub settings: PathBuf,
    pub auto_update_settings: bool,
    /// `None` skips the export stage and assumes `csv` already exists.
    pub export_command: Option<Vec<String>>,
    pub params: TrainParams,
}

/// Outcome of a completed retrain.
#[derive(Clone, Debug)]
pub struct RetrainReport {
    pub artifact: PathBuf,
    pub metadata: PathBuf,
    pub accuracy: f64,
    pub f1_weighted: f64,
    pub samples: usize,
    /// Non-fatal registering problems (registry or settings bookkeeping).
    pub warnings: Vec<String>,
}

pub struct Orchestrator {
    plan: RetrainPlan,
    stage: Stage,
    failed_from: Option<Stage>,
}

impl Orchestrator {
    pub fn new(plan: RetrainPlan) -> Self {
        Self {
            plan,
            stage: Stage::Exporting,
            failed_from: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The stage that was active when the run failed, if it did.
    pub fn failed_from(&self) -> Option<Stage> {
        self.failed_from
    }

    /// Execute the retrain to completion or first fatal error.
    pub fn run(&mut self, level: LogLevel) -> Result<RetrainReport> {
        match self.run_stages(level) {
            Ok(report) => {
                self.stage = Stage::Done;
                Ok(report)
            }
            Err(e) => {
                self.failed_from = Some(self.stage);
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, level: LogLevel) -> Result<RetrainReport> {
        self.stage = Stage::Exporting;
        match &self.plan.export_command {
            Some(command) => {
                log(
                    level,
                    LogLevel::Normal,
                    &format!("[exporting] running `{}`", command.join(" ")),
                );
                self.export(command)?;
            }
            None => log(
                level,
                LogLevel::Normal,
                &format!(
                    "[exporting] skipped, using existing {}",
                    self.plan.csv.display()
                ),
            ),
        }

        self.stage = Stage::Training;
        log(
            level,
            LogLevel::Normal,
            &format!("[training] version {} from {}", self.plan.version, self.plan.csv.display()),
        );
        let dataset = Dataset::load(&self.plan.csv)?;
        let plan = FeaturePlan::build(&dataset, FEATURE_SCHEMA)?;
        let outcome = train(&dataset, &plan, &self.plan.params, &self.plan.version)?;
        let report = TrainingReport::build(&outcome, &dataset, &plan, &self.plan.params)?;

        let artifact = artifact_path(&self.plan.output_dir, &self.plan.version);
        let metadata = persist_run(&outcome, &report, &artifact)?;
        log(
            level,
            LogLevel::Normal,
            &format!(
                "[training] accuracy {:.3}, artifact {}",
                outcome.evaluation.accuracy,
                artifact.display()
            ),
        );

        self.stage = Stage::Registering;
        let mut warnings = Vec::new();

        let entry = RegistryEntry {
            version: self.plan.version.clone(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
            dataset_file: self
                .plan
                .csv
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.plan.csv.display().to_string()),
            samples: dataset.len(),
            accuracy: outcome.evaluation.accuracy,
            f1_weighted: outcome.evaluation.f1_weighted,
            n_estimators: self.plan.params.n_estimators,
            note: "retrain".to_string(),
        };
        if let Err(e) = append_entry(&self.plan.registry, &entry) {
            warnings.push(format!("registry update failed: {e}"));
        } else {
            log(
                level,
                LogLevel::Normal,
                &format!("[registering] appended {} to {}", self.plan.version, self.plan.registry.display()),
            );
        }

        if self.plan.auto_update_settings {
            if let Err(e) = update_runtime_settings(&self.plan.settings, &self.plan.version, &artifact)
            {
                warnings.push(format!("settings update failed: {e}"));
            } else {
                log(
                    level,
                    LogLevel::Normal,
                    &format!("[registering] runtime settings now point at {}", self.plan.version),
                );
            }
        }

        for warning in &warnings {
            log(level, LogLevel::Normal, &format!("WARNING: {warning}"));
        }

        Ok(RetrainReport {
            artifact,
            metadata,
            accuracy: outcome.evaluation.accuracy,
            f1_weighted: outcome.evaluation.f1_weighted,
            samples: dataset.len(),
            warnings,
        })
    }

    fn export(&self, command: &[String]) -> Result<()> {
        let display = command.join(" ");
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::SubprocessFailed {
                command: "<empty export command>".to_string(),
                status: -1,
            })?;

        let status = Command::new(program).args(args).status()?;
        if !status.success() {
            return Err(Error::SubprocessFailed {
                command: display,
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;
    use std::fs;
    use tempfile::tempdir;

    fn synthetic_csv() -> String {
        let mut csv = String::from("skill_category,trend_score,scarcity_index,future_need_level\n");
        for i in 0..60 {
            let (cat, trend, label) = match i % 3 {
                0 => ("technical", 0.9, "HIGH"),
                1 => ("domain", 0.5, "MEDIUM"),
                _ => ("soft", 0.1, "LOW"),
            };
            writeln!(csv, "{cat},{},0.5,{label}", trend + i as f64 * 1e-3).unwrap();
        }
        csv
    }

    fn plan_in(dir: &std::path::Path, export_command: Option<Vec<String>>) -> RetrainPlan {
        RetrainPlan {
            version: "v7".to_string(),
            csv: dir.join("dataset.csv"),
            output_dir: dir.join("models"),
            registry: dir.join("MODEL_REGISTRY.md"),
            settings: dir.join("runtime_settings.json"),
            auto_update_settings: true,
            export_command,
            params: TrainParams {
                n_estimators: 5,
                ..TrainParams::default()
            },
        }
    }

    #[test]
    fn test_skip_export_full_run() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dataset.csv"), synthetic_csv()).unwrap();

        let mut orch = Orchestrator::new(plan_in(dir.path(), None));
        let report = orch.run(LogLevel::Quiet).unwrap();

        assert_eq!(orch.stage(), Stage::Done);
        assert!(report.warnings.is_empty());
        assert!(report.artifact.exists());
        assert!(report.metadata.exists());
        assert!(dir.path().join("MODEL_REGISTRY.md").exists());
        assert!(dir.path().join("runtime_settings.json").exists());
    }

    #[test]
    fn test_export_failure_stops_before_training() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dataset.csv"), synthetic_csv()).unwrap();

        let mut orch = Orchestrator::new(plan_in(
            dir.path(),
            Some(vec!["false".to_string()]),
        ));
        let err = orch.run(LogLevel::Quiet).unwrap_err();

        assert!(matches!(err, Error::SubprocessFailed { .. }));
        assert_eq!(orch.stage(), Stage::Failed);
        assert_eq!(orch.failed_from(), Some(Stage::Exporting));
        // Nothing downstream may have run.
        assert!(!dir.path().join("models").exists());
        assert!(!dir.path().join("MODEL_REGISTRY.md").exists());
    }

    #[test]
    fn test_export_subprocess_writes_dataset() {
        let dir = tempdir().unwrap();
        let staged = dir.path().join("staged.csv");
        fs::write(&staged, synthetic_csv()).unwrap();
        let target = dir.path().join("dataset.csv");

        let export = vec![
            "cp".to_string(),
            staged.display().to_string(),
            target.display().to_string(),
        ];
        let mut orch = Orchestrator::new(plan_in(dir.path(), Some(export)));
        let report = orch.run(LogLevel::Quiet).unwrap();

        assert_eq!(orch.stage(), Stage::Done);
        assert!(report.artifact.exists());
    }

    #[test]
    fn test_training_failure_marks_stage() {
        let dir = tempdir().unwrap();
        // Dataset is never written and export is skipped.
        let mut orch = Orchestrator::new(plan_in(dir.path(), None));
        let err = orch.run(LogLevel::Quiet).unwrap_err();

        assert!(matches!(err, Error::DatasetNotFound(_)));
        assert_eq!(orch.failed_from(), Some(Stage::Training));
    }

    #[test]
    fn test_registry_failure_is_non_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dataset.csv"), synthetic_csv()).unwrap();
        // A registry file without the table marker is a format error, but
        // the trained artifact must survive it.
        fs::write(dir.path().join("MODEL_REGISTRY.md"), "just prose\n").unwrap();

        let mut orch = Orchestrator::new(plan_in(dir.path(), None));
        let report = orch.run(LogLevel::Quiet).unwrap();

        assert_eq!(orch.stage(), Stage::Done);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("registry"));
        assert!(report.artifact.exists());
        // The malformed registry is untouched.
        assert_eq!(
            fs::read_to_string(dir.path().join("MODEL_REGISTRY.md")).unwrap(),
            "just prose\n"
        );
    }

    #[test]
    fn test_settings_untouched_without_flag() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dataset.csv"), synthetic_csv()).unwrap();

        let mut plan = plan_in(dir.path(), None);
        plan.auto_update_settings = false;
        let mut orch = Orchestrator::new(plan);
        orch.run(LogLevel::Quiet).unwrap();

        assert!(!dir.path().join("runtime_settings.json").exists());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Exporting.to_string(), "exporting");
        assert_eq!(Stage::Done.to_string(), "done");
    }
}
