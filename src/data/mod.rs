//! Dataset loading, schema declaration, and feature planning

pub mod loader;
pub mod plan;
pub mod schema;

pub use loader::Dataset;
pub use plan::FeaturePlan;
pub use schema::{FeatureKind, FeatureSpec, NeedLevel, FEATURE_SCHEMA, LABEL_COLUMN};
