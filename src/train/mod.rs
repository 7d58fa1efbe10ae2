//! Training: splitting, preprocessing, the forest, and the pipeline driver

pub mod encoder;
pub mod forest;
pub mod pipeline;
pub mod split;

pub use encoder::{OneHotEncoder, StandardScaler};
pub use forest::{balanced_class_weights, ForestParams, RandomForest};
pub use pipeline::{train, Evaluation, SkillModelPipeline, TrainOutcome, TrainParams};
pub use split::{stratified_split, Split};
