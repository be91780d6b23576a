//! Artifacts Module - Pre-trained Model & Scaler Loading
//!
//! Both artifacts are opaque serialized objects produced by the training
//! pipeline. They are loaded exactly once at process start; absence,
//! corruption, or a schema mismatch of either is a fatal startup error,
//! never a per-request error.

pub mod classifier;
pub mod scaler;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::logic::features::{layout, FEATURE_COUNT};
pub use classifier::{ClassifierArtifact, ClassifierModel, Tree, TreeNode};
pub use scaler::{ScalerArtifact, StandardScaler};

/// Startup-time artifact failure. Fatal; the process never becomes ready.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse artifact '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("artifact '{path}' is invalid: {reason}")]
    Invalid { path: String, reason: String },
}

fn invalid(path: &Path, reason: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load and validate the fitted scaler.
pub fn load_scaler(path: impl AsRef<Path>) -> Result<Arc<StandardScaler>, ArtifactError> {
    let path = path.as_ref();
    let scaler: StandardScaler = read_json(path)?;

    if !layout::matches_layout(&scaler.feature_names) {
        return Err(invalid(path, "feature names do not match the fitted schema"));
    }
    if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
        return Err(invalid(path, "mean/scale width does not match the schema"));
    }
    if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
        return Err(invalid(path, "scale contains zero or non-finite entries"));
    }

    tracing::info!(path = %path.display(), "scaler artifact loaded");
    Ok(Arc::new(scaler))
}

/// Load and validate the fitted classifier.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<ClassifierModel>, ArtifactError> {
    let path = path.as_ref();
    let mut model: ClassifierModel = read_json(path)?;

    if !layout::matches_layout(model.feature_names()) {
        return Err(invalid(path, "feature names do not match the fitted schema"));
    }
    if model.n_features() != FEATURE_COUNT {
        return Err(invalid(
            path,
            format!("n_features {} != {}", model.n_features(), FEATURE_COUNT),
        ));
    }

    match &mut model {
        ClassifierModel::RandomForest { trees, .. } => {
            validate_trees(path, trees, 2)?;
            // Exporters may emit raw leaf sample counts; reduce every node to
            // a probability distribution so predictions average cleanly.
            for tree in trees {
                for node in &mut tree.nodes {
                    let sum: f64 = node.value.iter().sum();
                    if sum > 0.0 {
                        for v in &mut node.value {
                            *v /= sum;
                        }
                    }
                }
            }
        }
        ClassifierModel::GradientBoosting { trees, .. } => {
            validate_trees(path, trees, 1)?;
        }
        ClassifierModel::LogisticRegression { coefficients, .. } => {
            if coefficients.len() != FEATURE_COUNT {
                return Err(invalid(path, "coefficient width does not match the schema"));
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        model_type = model.model_type(),
        "classifier artifact loaded"
    );
    Ok(Arc::new(model))
}

fn validate_trees(path: &Path, trees: &[Tree], value_width: usize) -> Result<(), ArtifactError> {
    if trees.is_empty() {
        return Err(invalid(path, "model has no trees"));
    }
    for (t, tree) in trees.iter().enumerate() {
        if tree.nodes.is_empty() {
            return Err(invalid(path, format!("tree {t} has no nodes")));
        }
        for (n, node) in tree.nodes.iter().enumerate() {
            if node.value.len() != value_width {
                return Err(invalid(
                    path,
                    format!("tree {t} node {n}: expected value width {value_width}"),
                ));
            }
            if node.is_leaf() {
                continue;
            }
            let in_bounds = |i: i64| i >= 0 && (i as usize) < tree.nodes.len();
            if !in_bounds(node.left) || !in_bounds(node.right) {
                return Err(invalid(path, format!("tree {t} node {n}: child out of bounds")));
            }
            if node.feature < 0 || node.feature as usize >= FEATURE_COUNT {
                return Err(invalid(path, format!("tree {t} node {n}: split feature out of range")));
            }
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
