//! Model evaluation

pub mod classification;

pub use classification::{per_class_accuracy_by_label, ConfusionMatrix, WeightedMetrics};
