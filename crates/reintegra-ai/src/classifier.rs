//! Risk classification for a single participant.
//!
//! Normalizes the raw row for the selected variant, asks the matching tree
//! for `[P(complete), P(abandon)]`, and labels the participant as at risk of
//! abandoning whenever `P(abandon)` reaches [`ABANDON_THRESHOLD`].

use reintegra_core::{AttributeRow, ModelVariant, normalize_for};
use serde::Serialize;
use tracing::info;

use crate::error::ClassifyError;
use crate::model::check_input;
use crate::registry::ModelRegistry;

/// Decision cutoff on `P(abandon)`, inclusive.
pub const ABANDON_THRESHOLD: f64 = 0.1;

/// Predicted outcome of the reintegration process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Will complete the process.
    Complete,
    /// Will abandon the process.
    Abandon,
}

impl Outcome {
    /// Both outcomes in class-index order.
    pub const ALL: [Outcome; 2] = [Self::Complete, Self::Abandon];

    pub fn from_abandon_probability(p_abandon: f64) -> Self {
        if p_abandon >= ABANDON_THRESHOLD {
            Self::Abandon
        } else {
            Self::Complete
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Abandon => "abandon",
        }
    }

    /// Label shown to program staff.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete => "Culminará el proceso",
            Self::Abandon => "Abandonará el proceso",
        }
    }
}

/// Classification result for a single row.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub variant: ModelVariant,
    pub model: String,
    pub outcome: Outcome,
    pub label: &'static str,
    pub p_complete: f64,
    pub p_abandon: f64,
    pub threshold: f64,
}

impl Classification {
    /// Probabilities in class-index order, matching [`Outcome::ALL`].
    pub fn probabilities(&self) -> [f64; 2] {
        [self.p_complete, self.p_abandon]
    }
}

/// Classification adapter over a [`ModelRegistry`].
pub struct Classifier {
    registry: ModelRegistry,
    include_bias: bool,
}

impl Classifier {
    /// Classifier for models fitted without the bias-sensitive column.
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            include_bias: false,
        }
    }

    pub fn with_include_bias(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }

    pub fn include_bias(&self) -> bool {
        self.include_bias
    }

    /// Classify an already-normalized row.
    ///
    /// The row's columns must match the variant's model exactly
    /// ([`ClassifyError::SchemaMismatch`] otherwise). Model errors propagate
    /// unchanged.
    pub fn classify(
        &self,
        canonical: &AttributeRow,
        variant: ModelVariant,
    ) -> Result<Classification, ClassifyError> {
        let model = self.registry.model(variant);
        let batch = canonical.to_record_batch()?;
        check_input(model.expected_columns(), &batch)?;

        let proba = model.predict_proba(&batch)?;
        if proba.iter().any(|p| !p.is_finite() || !(0.0..=1.0).contains(p)) {
            return Err(ClassifyError::InvalidProbabilities(proba));
        }

        let [p_complete, p_abandon] = proba;
        let outcome = Outcome::from_abandon_probability(p_abandon);
        info!(
            variant = %variant,
            model = %model.name(),
            p_abandon,
            outcome = outcome.as_str(),
            "classified row"
        );

        Ok(Classification {
            variant,
            model: model.name().to_string(),
            outcome,
            label: outcome.label(),
            p_complete,
            p_abandon,
            threshold: ABANDON_THRESHOLD,
        })
    }

    /// Normalize a raw row for `variant`, then classify it.
    ///
    /// Returns the normalized row alongside the result so callers can show
    /// what the model actually saw.
    pub fn assess(
        &self,
        raw: &AttributeRow,
        variant: ModelVariant,
    ) -> Result<(AttributeRow, Classification), ClassifyError> {
        let canonical = normalize_for(raw, variant, self.include_bias);
        let classification = self.classify(&canonical, variant)?;
        Ok((canonical, classification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProbabilityModel;
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    /// Returns a fixed probability vector for any well-formed row.
    struct FixedModel {
        name: String,
        columns: Vec<String>,
        proba: [f64; 2],
    }

    impl FixedModel {
        fn new(variant: ModelVariant, include_bias: bool, p_abandon: f64) -> Self {
            Self {
                name: format!("fixed-{variant}"),
                columns: variant
                    .expected_columns(include_bias)
                    .into_iter()
                    .map(String::from)
                    .collect(),
                proba: [1.0 - p_abandon, p_abandon],
            }
        }
    }

    impl ProbabilityModel for FixedModel {
        fn name(&self) -> &str {
            &self.name
        }

        fn expected_columns(&self) -> &[String] {
            &self.columns
        }

        fn predict_proba(&self, _batch: &RecordBatch) -> Result<[f64; 2], ClassifyError> {
            Ok(self.proba)
        }
    }

    /// Fails every prediction, to check propagation.
    struct BrokenModel(Vec<String>);

    impl ProbabilityModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn expected_columns(&self) -> &[String] {
            &self.0
        }

        fn predict_proba(&self, _batch: &RecordBatch) -> Result<[f64; 2], ClassifyError> {
            Err(ClassifyError::RowCount(0))
        }
    }

    fn classifier(p_simple: f64, p_completo: f64) -> Classifier {
        Classifier::new(ModelRegistry::from_models(
            Arc::new(FixedModel::new(ModelVariant::Simple, false, p_simple)),
            Arc::new(FixedModel::new(ModelVariant::Completo, false, p_completo)),
        ))
    }

    fn raw_simple() -> AttributeRow {
        AttributeRow::new()
            .with("OccupationalStatus", "No Aplica")
            .with("SpouseStatus", "<No Registra>")
            .with("TrainingTrack", "<No Registra>")
            .with("DisbursedBenefit", "No")
            .with("SocialServiceStatus", "<No Aplica>")
    }

    fn raw_full() -> AttributeRow {
        raw_simple()
            .with("DemobilizationType", "Colectiva")
            .with("AgeGroup", "Entre 18 y 25 años")
            .with("Sex", "Masculino")
            .with("EducationLevel", "Bachiller")
            .with("MaxTrainingLevel", "Técnico Laboral")
            .with("SocialServiceType", "<No Aplica>")
            .with("NumChildren", -2)
            .with("HouseholdSize", 3)
            .with("HousingType", "Casa")
            .with("HousingTenure", "Familiar")
            .with("BasicUtilities", "Sí")
            .with("HealthRegime", "S - SUBSIDIADO")
            .with("DisbursementBreakdown", "Parcial")
            .with("CutoffDate", "2019-12-31")
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(Outcome::from_abandon_probability(0.1), Outcome::Abandon);
        assert_eq!(Outcome::from_abandon_probability(0.0999), Outcome::Complete);
        assert_eq!(
            Outcome::from_abandon_probability(0.099_999_999_999),
            Outcome::Complete
        );
        assert_eq!(Outcome::from_abandon_probability(0.0), Outcome::Complete);
        assert_eq!(Outcome::from_abandon_probability(1.0), Outcome::Abandon);
    }

    #[test]
    fn classify_at_boundary() {
        let clf = classifier(0.1, 0.0);
        let canonical = normalize_for(&raw_simple(), ModelVariant::Simple, false);
        let result = clf.classify(&canonical, ModelVariant::Simple).unwrap();
        assert_eq!(result.outcome, Outcome::Abandon);
        assert_eq!(result.label, "Abandonará el proceso");
        assert_eq!(result.threshold, 0.1);

        let clf = classifier(0.0999, 0.0);
        let result = clf.classify(&canonical, ModelVariant::Simple).unwrap();
        assert_eq!(result.outcome, Outcome::Complete);
        assert_eq!(result.label, "Culminará el proceso");
    }

    #[test]
    fn low_abandon_probability_still_flags() {
        // 0.3 would be "complete" at a 0.5 cutoff.
        let clf = classifier(0.3, 0.3);
        let (_, result) = clf.assess(&raw_simple(), ModelVariant::Simple).unwrap();
        assert_eq!(result.outcome, Outcome::Abandon);
        assert!((result.p_complete - 0.7).abs() < 1e-12);
        assert_eq!(result.probabilities(), [result.p_complete, result.p_abandon]);
    }

    #[test]
    fn assess_routes_to_the_variant_model() {
        let clf = classifier(0.5, 0.01);

        let (row, result) = clf.assess(&raw_full(), ModelVariant::Completo).unwrap();
        assert_eq!(result.model, "fixed-Completo");
        assert_eq!(result.outcome, Outcome::Complete);
        assert_eq!(row.len(), 17);
        assert!(!row.contains_key("DisbursementBreakdown"));
        assert!(!row.contains_key("CutoffDate"));

        let (row, result) = clf.assess(&raw_full(), ModelVariant::Simple).unwrap();
        assert_eq!(result.model, "fixed-Simple");
        assert_eq!(result.outcome, Outcome::Abandon);
        assert_eq!(row.len(), 5);
    }

    #[test]
    fn bias_flag_reaches_the_normalizer() {
        let registry = ModelRegistry::from_models(
            Arc::new(FixedModel::new(ModelVariant::Simple, true, 0.0)),
            Arc::new(FixedModel::new(ModelVariant::Completo, true, 0.0)),
        );
        let clf = Classifier::new(registry);
        assert!(!clf.include_bias());
        let clf = clf.with_include_bias(true);
        assert!(clf.include_bias());
        let (row, _) = clf.assess(&raw_full(), ModelVariant::Completo).unwrap();
        assert!(row.contains_key("DisbursementBreakdown"));
    }

    #[test]
    fn schema_mismatch_aborts() {
        let clf = classifier(0.0, 0.0);
        // A minimal row sent to the full model.
        let canonical = normalize_for(&raw_full(), ModelVariant::Simple, false);
        assert!(matches!(
            clf.classify(&canonical, ModelVariant::Completo),
            Err(ClassifyError::SchemaMismatch { .. })
        ));

        // The biased full row against an unbiased model.
        let canonical = normalize_for(&raw_full(), ModelVariant::Completo, true);
        assert!(matches!(
            clf.classify(&canonical, ModelVariant::Completo),
            Err(ClassifyError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn model_errors_propagate_unchanged() {
        let cols: Vec<String> = ModelVariant::Simple
            .expected_columns(false)
            .into_iter()
            .map(String::from)
            .collect();
        let clf = Classifier::new(ModelRegistry::from_models(
            Arc::new(BrokenModel(cols)),
            Arc::new(FixedModel::new(ModelVariant::Completo, false, 0.0)),
        ));
        assert!(matches!(
            clf.assess(&raw_simple(), ModelVariant::Simple),
            Err(ClassifyError::RowCount(0))
        ));
    }

    #[test]
    fn rejects_out_of_range_probabilities() {
        let clf = classifier(1.5, 0.0);
        assert!(matches!(
            clf.assess(&raw_simple(), ModelVariant::Simple),
            Err(ClassifyError::InvalidProbabilities(_))
        ));
    }

    #[test]
    fn serializes_for_reports() {
        let clf = classifier(0.25, 0.0);
        let (_, result) = clf.assess(&raw_simple(), ModelVariant::Simple).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["variant"], "Simple");
        assert_eq!(json["outcome"], "abandon");
        assert_eq!(json["label"], "Abandonará el proceso");
        assert_eq!(json["threshold"], 0.1);
    }
}
