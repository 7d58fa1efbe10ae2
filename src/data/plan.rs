//! Feature plan construction
//!
//! Intersects the declared schema with the columns actually present in a
//! loaded dataset and partitions the result by declared kind. Absent columns
//! are surfaced, never silently zero-filled. Declared-numeric columns are
//! validated cell-by-cell here so that type mismatches fail before any
//! fitting work starts.

use serde::{Deserialize, Serialize};

use crate::data::loader::Dataset;
use crate::data::schema::{FeatureKind, FeatureSpec};
use crate::error::{Error, Result};

/// The usable feature columns of one training run, split by kind.
///
/// Invariant: `categorical ∪ numeric` equals the intersection of the
/// declared list and the dataset's columns, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePlan {
    pub categorical: Vec<String>,
    pub numeric: Vec<String>,
    /// Declared columns the dataset does not carry; excluded from both
    /// partitions and recorded in training metadata.
    pub missing: Vec<String>,
}

impl FeaturePlan {
    /// Build the plan for `dataset` from a declared schema.
    ///
    /// Fails with [`Error::NoUsableFeatures`] when no declared column is
    /// present, and [`Error::SchemaMismatch`] when a declared-numeric column
    /// holds a non-numeric cell.
    pub fn build(dataset: &Dataset, schema: &[FeatureSpec]) -> Result<Self> {
        let mut categorical = Vec::new();
        let mut numeric = Vec::new();
        let mut missing = Vec::new();

        for spec in schema {
            if dataset.column_index(spec.name).is_none() {
                missing.push(spec.name.to_string());
                continue;
            }
            match spec.kind {
                FeatureKind::Categorical => categorical.push(spec.name.to_string()),
                FeatureKind::Numeric => {
                    // Fail fast on declaration/table mismatch.
                    dataset.numeric_column(spec.name)?;
                    numeric.push(spec.name.to_string());
                }
            }
        }

        if categorical.is_empty() && numeric.is_empty() {
            return Err(Error::NoUsableFeatures { missing });
        }

        Ok(Self {
            categorical,
            numeric,
            missing,
        })
    }

    /// All usable columns in declaration order (categorical before numeric
    /// within their own declaration order).
    pub fn used(&self) -> Vec<String> {
        self.categorical
            .iter()
            .chain(self.numeric.iter())
            .cloned()
            .collect()
    }

    pub fn n_used(&self) -> usize {
        self.categorical.len() + self.numeric.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::FEATURE_SCHEMA;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn load(content: &str) -> (Dataset, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        let ds = Dataset::load(file.path()).unwrap();
        (ds, file)
    }

    #[test]
    fn test_partitions_by_declared_kind() {
        let (ds, _f) = load(
            "role_name,skill_name,trend_score,scarcity_index,future_need_level\n\
             Data Engineer,Rust,0.8,0.6,HIGH\n\
             Analyst,SQL,0.4,0.2,MEDIUM\n",
        );
        let plan = FeaturePlan::build(&ds, FEATURE_SCHEMA).unwrap();
        assert_eq!(plan.categorical, vec!["role_name", "skill_name"]);
        assert_eq!(plan.numeric, vec!["trend_score", "scarcity_index"]);
        assert_eq!(plan.n_used(), 4);
    }

    #[test]
    fn test_absent_columns_are_surfaced_not_assumed() {
        let (ds, _f) = load(
            "skill_name,trend_score,future_need_level\n\
             Rust,0.8,HIGH\n",
        );
        let plan = FeaturePlan::build(&ds, FEATURE_SCHEMA).unwrap();
        assert!(plan.missing.contains(&"role_name".to_string()));
        assert!(plan.missing.contains(&"economic_indicator".to_string()));
        assert!(!plan.used().contains(&"role_name".to_string()));
        // used ∪ missing covers the whole declaration
        assert_eq!(plan.n_used() + plan.missing.len(), FEATURE_SCHEMA.len());
    }

    #[test]
    fn test_no_usable_features() {
        let (ds, _f) = load(
            "irrelevant,future_need_level\n\
             x,HIGH\n",
        );
        let err = FeaturePlan::build(&ds, FEATURE_SCHEMA).unwrap_err();
        assert!(matches!(err, Error::NoUsableFeatures { .. }));
    }

    #[test]
    fn test_numeric_declaration_validated_at_plan_time() {
        let (ds, _f) = load(
            "trend_score,future_need_level\n\
             high,HIGH\n",
        );
        let err = FeaturePlan::build(&ds, FEATURE_SCHEMA).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_dataset_file_still_fails_first() {
        assert!(Dataset::load(Path::new("/no/such/file.csv")).is_err());
    }
}
