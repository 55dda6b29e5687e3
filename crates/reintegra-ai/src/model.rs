//! The classifier seam.

use std::collections::BTreeSet;

use arrow::record_batch::RecordBatch;

use crate::error::ClassifyError;

/// A trained binary classifier over a one-row attribute batch.
///
/// Implementations are loaded once and shared read-only across requests.
pub trait ProbabilityModel: Send + Sync {
    /// Artifact name, for logs and reports.
    fn name(&self) -> &str;

    /// Columns the model was fitted on.
    fn expected_columns(&self) -> &[String];

    /// `[P(complete), P(abandon)]` for the single row in `batch`.
    fn predict_proba(&self, batch: &RecordBatch) -> Result<[f64; 2], ClassifyError>;
}

/// Require `batch` to have exactly one row and exactly the `expected` columns
/// (in any order).
pub fn check_input(expected: &[String], batch: &RecordBatch) -> Result<(), ClassifyError> {
    if batch.num_rows() != 1 {
        return Err(ClassifyError::RowCount(batch.num_rows()));
    }

    let schema = batch.schema();
    let found: BTreeSet<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let wanted: BTreeSet<&str> = expected.iter().map(|s| s.as_str()).collect();

    if found.len() != schema.fields().len() || found != wanted {
        return Err(ClassifyError::SchemaMismatch {
            expected: wanted.into_iter().map(str::to_string).collect(),
            found: schema.fields().iter().map(|f| f.name().clone()).collect(),
        });
    }
    Ok(())
}
