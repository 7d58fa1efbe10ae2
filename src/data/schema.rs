//! Dataset schema declaration
//!
//! Column typing is declared up front rather than inferred from storage
//! types at load time. The declared schema is validated against the loaded
//! table when the feature plan is built; a mismatch fails fast.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the label column every training dataset must carry.
pub const LABEL_COLUMN: &str = "future_need_level";

/// Predicted demand level for a skill within a role.
///
/// The label domain is fixed and ordered; rows carrying any other value are
/// dropped at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedLevel {
    Low,
    Medium,
    High,
}

impl NeedLevel {
    /// All levels in canonical (ascending demand) order.
    pub const ALL: [NeedLevel; 3] = [NeedLevel::Low, NeedLevel::Medium, NeedLevel::High];

    /// Canonical wire form (`LOW`, `MEDIUM`, `HIGH`).
    pub fn as_str(self) -> &'static str {
        match self {
            NeedLevel::Low => "LOW",
            NeedLevel::Medium => "MEDIUM",
            NeedLevel::High => "HIGH",
        }
    }

    /// Position within [`NeedLevel::ALL`]; used as the class index for the
    /// confusion matrix and the forest's leaf distributions.
    pub fn index(self) -> usize {
        match self {
            NeedLevel::Low => 0,
            NeedLevel::Medium => 1,
            NeedLevel::High => 2,
        }
    }

    /// Class labels in canonical order, as recorded under `model_classes`.
    pub fn class_names() -> Vec<String> {
        Self::ALL.iter().map(|l| l.as_str().to_string()).collect()
    }
}

impl fmt::Display for NeedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeedLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(NeedLevel::Low),
            "MEDIUM" => Ok(NeedLevel::Medium),
            "HIGH" => Ok(NeedLevel::High),
            _ => Err(()),
        }
    }
}

/// How a feature column is treated by the preprocessing transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// One-hot encoded; unseen categories map to the all-zero vector.
    Categorical,
    /// Standardized with training-partition statistics.
    Numeric,
}

/// A declared feature column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn cat(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Categorical,
    }
}

const fn num(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Numeric,
    }
}

/// The fixed, ordered candidate feature list for the skill-demand model.
///
/// The exported dataset may carry a subset; absent columns are surfaced as
/// "missing" by the feature plan, never silently assumed.
pub const FEATURE_SCHEMA: &[FeatureSpec] = &[
    cat("role_name"),
    cat("skill_name"),
    cat("skill_category"),
    cat("department"),
    num("trend_score"),
    num("current_usage_count"),
    num("projected_usage_count"),
    num("scarcity_index"),
    num("difficulty_index"),
    num("avg_salary_impact"),
    num("economic_indicator"),
];
