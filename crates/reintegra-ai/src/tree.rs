//! Fitted decision trees stored as JSON artifacts.
//!
//! An artifact lists the feature columns, the two class names, and a flat
//! node array rooted at index 0. Category splits send a row left when its
//! value is in the split set; threshold splits send it left when the count
//! is `<= threshold`. Null values always go right. Leaves carry per-class
//! sample counts, turned into probabilities by dividing by their sum.

use std::collections::HashSet;
use std::path::Path;

use arrow::array::{Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ClassifyError;
use crate::model::{ProbabilityModel, check_input};

/// Serialized form of a fitted tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub name: String,
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Category {
        feature: String,
        values: Vec<String>,
        left: usize,
        right: usize,
    },
    Threshold {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        counts: [f64; 2],
    },
}

/// A validated decision tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    artifact: TreeArtifact,
    /// Per-node split sets, indexed like `artifact.nodes`.
    category_sets: Vec<HashSet<String>>,
}

impl DecisionTree {
    /// Validate an artifact.
    ///
    /// Children must point forward (index greater than the parent), which
    /// rules out cycles and guarantees every walk ends at a leaf.
    pub fn from_artifact(artifact: TreeArtifact) -> Result<Self, ClassifyError> {
        let invalid = |msg: String| ClassifyError::InvalidArtifact(format!("{}: {msg}", artifact.name));

        if artifact.classes.len() != 2 {
            return Err(invalid(format!(
                "expected 2 classes, found {}",
                artifact.classes.len()
            )));
        }
        if artifact.nodes.is_empty() {
            return Err(invalid("tree has no nodes".into()));
        }

        let features: HashSet<&str> = artifact.features.iter().map(|s| s.as_str()).collect();
        if features.len() != artifact.features.len() {
            return Err(invalid("duplicate feature names".into()));
        }

        let n = artifact.nodes.len();
        let mut category_sets = Vec::with_capacity(n);
        for (idx, node) in artifact.nodes.iter().enumerate() {
            let mut set = HashSet::new();
            match node {
                Node::Category {
                    feature,
                    values,
                    left,
                    right,
                } => {
                    check_split(idx, feature, *left, *right, n, &features).map_err(invalid)?;
                    set.extend(values.iter().cloned());
                }
                Node::Threshold {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    check_split(idx, feature, *left, *right, n, &features).map_err(invalid)?;
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {idx}: threshold is not finite")));
                    }
                }
                Node::Leaf { counts } => {
                    let total: f64 = counts.iter().sum();
                    if counts.iter().any(|c| !c.is_finite() || *c < 0.0) || total <= 0.0 {
                        return Err(invalid(format!("node {idx}: bad leaf counts {counts:?}")));
                    }
                }
            }
            category_sets.push(set);
        }

        Ok(Self {
            artifact,
            category_sets,
        })
    }

    /// Load and validate an artifact file.
    ///
    /// Every failure is reported as [`ClassifyError::ClassifierUnavailable`].
    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        let unavailable = |reason: String| ClassifyError::ClassifierUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        let artifact: TreeArtifact =
            serde_json::from_str(&text).map_err(|e| unavailable(e.to_string()))?;
        let tree = Self::from_artifact(artifact).map_err(|e| unavailable(e.to_string()))?;

        info!(
            name = %tree.artifact.name,
            nodes = tree.node_count(),
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            features = tree.artifact.features.len(),
            "loaded decision tree"
        );
        Ok(tree)
    }

    pub fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    pub fn node_count(&self) -> usize {
        self.artifact.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.artifact
            .nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        // Children always follow parents, so one forward pass suffices.
        let mut depth = vec![0usize; self.artifact.nodes.len()];
        let mut max = 0;
        for (idx, node) in self.artifact.nodes.iter().enumerate() {
            if let Node::Category { left, right, .. } | Node::Threshold { left, right, .. } = node {
                let d = depth[idx] + 1;
                depth[*left] = depth[*left].max(d);
                depth[*right] = depth[*right].max(d);
                max = max.max(d);
            }
        }
        max
    }

    /// Walk the tree for the single row in `batch`, returning the leaf
    /// index and its class counts.
    fn leaf_for(&self, batch: &RecordBatch) -> Result<(usize, [f64; 2]), ClassifyError> {
        let mut idx = 0;
        loop {
            idx = match &self.artifact.nodes[idx] {
                Node::Leaf { counts } => return Ok((idx, *counts)),
                Node::Category {
                    feature,
                    left,
                    right,
                    ..
                } => match category_at(batch, feature)? {
                    Some(v) if self.category_sets[idx].contains(v) => *left,
                    _ => *right,
                },
                Node::Threshold {
                    feature,
                    threshold,
                    left,
                    right,
                } => match number_at(batch, feature)? {
                    Some(x) if x <= *threshold => *left,
                    _ => *right,
                },
            };
        }
    }
}

impl ProbabilityModel for DecisionTree {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn expected_columns(&self) -> &[String] {
        &self.artifact.features
    }

    fn predict_proba(&self, batch: &RecordBatch) -> Result<[f64; 2], ClassifyError> {
        check_input(&self.artifact.features, batch)?;

        let (leaf, counts) = self.leaf_for(batch)?;
        let total = counts[0] + counts[1];
        let proba = [counts[0] / total, counts[1] / total];

        debug!(tree = %self.artifact.name, leaf, ?proba, "tree prediction");
        Ok(proba)
    }
}

fn check_split(
    idx: usize,
    feature: &str,
    left: usize,
    right: usize,
    n: usize,
    features: &HashSet<&str>,
) -> Result<(), String> {
    if !features.contains(feature) {
        return Err(format!("node {idx}: split on unlisted feature {feature:?}"));
    }
    for child in [left, right] {
        if child <= idx || child >= n {
            return Err(format!("node {idx}: child {child} out of order or range"));
        }
    }
    Ok(())
}

// ── Arrow extraction helpers ──

fn category_at<'a>(batch: &'a RecordBatch, feature: &str) -> Result<Option<&'a str>, ClassifyError> {
    let col = column(batch, feature)?;
    if col.is_null(0) {
        return Ok(None);
    }
    if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
        return Ok(Some(arr.value(0)));
    }
    if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
        return Ok(Some(arr.value(0)));
    }
    Err(ClassifyError::FeatureType {
        column: feature.to_string(),
        expected: "string",
        found: col.data_type().to_string(),
    })
}

fn number_at(batch: &RecordBatch, feature: &str) -> Result<Option<f64>, ClassifyError> {
    let col = column(batch, feature)?;
    if col.is_null(0) {
        return Ok(None);
    }
    if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        return Ok(Some(arr.value(0) as f64));
    }
    if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
        return Ok(Some(arr.value(0) as f64));
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        return Ok(Some(arr.value(0)));
    }
    Err(ClassifyError::FeatureType {
        column: feature.to_string(),
        expected: "number",
        found: col.data_type().to_string(),
    })
}

fn column<'a>(batch: &'a RecordBatch, feature: &str) -> Result<&'a dyn Array, ClassifyError> {
    batch
        .column_by_name(feature)
        .map(|c| &**c)
        .ok_or_else(|| ClassifyError::SchemaMismatch {
            expected: vec![feature.to_string()],
            found: batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect(),
        })
}
