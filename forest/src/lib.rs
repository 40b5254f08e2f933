pub mod artifact;
pub mod dataset;
pub mod error;
pub mod forest;
pub mod tree;

pub use artifact::Artifact;
pub use dataset::Dataset;
pub use error::{ArtifactError, ForestError};
pub use forest::{MaxFeatures, RandomForest, TrainingConfig};
pub use tree::DecisionTree;
