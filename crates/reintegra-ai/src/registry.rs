//! Load-once holder for the two trained variants.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use reintegra_core::ModelVariant;
use tracing::{info, warn};

use crate::error::ClassifyError;
use crate::model::ProbabilityModel;
use crate::tree::DecisionTree;

/// The `Simple` and `Completo` classifiers, shared read-only.
#[derive(Clone)]
pub struct ModelRegistry {
    simple: Arc<dyn ProbabilityModel>,
    completo: Arc<dyn ProbabilityModel>,
}

impl ModelRegistry {
    /// Load both tree artifacts from `dir`.
    ///
    /// Fails with [`ClassifyError::ClassifierUnavailable`] if either artifact
    /// is missing or corrupt. There is no partial registry.
    pub fn load(dir: &Path) -> Result<Self, ClassifyError> {
        let simple = load_variant(dir, ModelVariant::Simple)?;
        let completo = load_variant(dir, ModelVariant::Completo)?;
        info!(dir = %dir.display(), "model registry ready");
        Ok(Self::from_models(simple, completo))
    }

    /// Build a registry from already-constructed models.
    pub fn from_models(
        simple: Arc<dyn ProbabilityModel>,
        completo: Arc<dyn ProbabilityModel>,
    ) -> Self {
        Self { simple, completo }
    }

    pub fn model(&self, variant: ModelVariant) -> &dyn ProbabilityModel {
        match variant {
            ModelVariant::Simple => self.simple.as_ref(),
            ModelVariant::Completo => self.completo.as_ref(),
        }
    }
}

fn load_variant(
    dir: &Path,
    variant: ModelVariant,
) -> Result<Arc<dyn ProbabilityModel>, ClassifyError> {
    let tree = DecisionTree::load(&dir.join(variant.artifact_file()))?;

    // Artifacts don't record their bias setting. Requests still fail with
    // SchemaMismatch.
    let features: BTreeSet<&str> = tree.expected_columns().iter().map(|s| s.as_str()).collect();
    let fits = [false, true].into_iter().any(|bias| {
        let expected: BTreeSet<&str> = variant.expected_columns(bias).into_iter().collect();
        expected == features
    });
    if !fits {
        warn!(
            variant = %variant,
            tree = %tree.name(),
            "artifact features do not match the variant schema"
        );
    }

    Ok(Arc::new(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeArtifact;
    use serde_json::json;

    fn stump(name: &str, features: Vec<&str>) -> TreeArtifact {
        serde_json::from_value(json!({
            "name": name,
            "features": features,
            "classes": ["complete", "abandon"],
            "nodes": [{"kind": "leaf", "counts": [9.0, 1.0]}]
        }))
        .unwrap()
    }

    #[test]
    fn loads_both_artifacts() {
        let tmp = tempfile::TempDir::new().unwrap();
        for variant in ModelVariant::ALL {
            let artifact = stump(variant.name(), variant.expected_columns(false));
            std::fs::write(
                tmp.path().join(variant.artifact_file()),
                serde_json::to_string(&artifact).unwrap(),
            )
            .unwrap();
        }

        let registry = ModelRegistry::load(tmp.path()).unwrap();
        assert_eq!(registry.model(ModelVariant::Simple).name(), "Simple");
        assert_eq!(registry.model(ModelVariant::Completo).name(), "Completo");
        assert_eq!(
            registry.model(ModelVariant::Completo).expected_columns().len(),
            17
        );
    }

    #[test]
    fn missing_artifact_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let artifact = stump("Simple", ModelVariant::Simple.expected_columns(false));
        std::fs::write(
            tmp.path().join(ModelVariant::Simple.artifact_file()),
            serde_json::to_string(&artifact).unwrap(),
        )
        .unwrap();

        match ModelRegistry::load(tmp.path()) {
            Err(ClassifyError::ClassifierUnavailable { path, .. }) => {
                assert!(path.ends_with(ModelVariant::Completo.artifact_file()));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("registry loaded without the full model"),
        }
    }
}
