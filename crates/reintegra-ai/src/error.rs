use std::path::PathBuf;

use reintegra_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("schema mismatch: model expects {expected:?}, row has {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("classifier unavailable at {}: {reason}", path.display())]
    ClassifierUnavailable { path: PathBuf, reason: String },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("column {column} has type {found}, split expects {expected}")]
    FeatureType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("expected a single row, got {0}")]
    RowCount(usize),

    #[error("classifier returned invalid probabilities {0:?}")]
    InvalidProbabilities([f64; 2]),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
