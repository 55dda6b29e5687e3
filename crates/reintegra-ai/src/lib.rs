//! Inference layer: decision-tree artifacts, the load-once model registry,
//! and the thresholded risk classifier.

mod classifier;
mod error;
mod model;
mod registry;
mod tree;

pub use classifier::{ABANDON_THRESHOLD, Classification, Classifier, Outcome};
pub use error::ClassifyError;
pub use model::{ProbabilityModel, check_input};
pub use registry::ModelRegistry;
pub use tree::{DecisionTree, Node, TreeArtifact};
