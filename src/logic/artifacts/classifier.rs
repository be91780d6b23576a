//! Fitted classifier artifact
//!
//! Serde-tagged union over the model families the training pipeline exports.
//! Tree nodes carry their expected value (per-class distribution for forests,
//! scalar margin for boosting) so the attribution engine can walk decision
//! paths without the training data.

use ndarray::ArrayView1;
use serde::Deserialize;

use crate::logic::error::PredictError;

/// Capability interface for the classification artifact.
///
/// `predict_probability` is always the positive (malignant) class probability;
/// orientation to the predicted class happens in the confidence resolver.
pub trait ClassifierArtifact: Send + Sync {
    fn predict_class(&self, scaled: ArrayView1<f64>) -> Result<u8, PredictError>;
    fn predict_probability(&self, scaled: ArrayView1<f64>) -> Result<f64, PredictError>;
}

/// One decision-tree node. `left < 0` marks a leaf (exporter convention).
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    pub feature: i64,
    pub threshold: f64,
    pub left: i64,
    pub right: i64,
    /// Expected value at this node: `[p_benign, p_malignant]` for forests,
    /// `[margin]` for boosting.
    pub value: Vec<f64>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.left < 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walk the decision path for one scaled record, returning the leaf.
    pub fn leaf_for(&self, scaled: ArrayView1<f64>) -> Result<&TreeNode, PredictError> {
        let mut index = 0usize;
        loop {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| PredictError::Model(format!("node index {index} out of range")))?;
            if node.is_leaf() {
                return Ok(node);
            }
            let feature = node.feature as usize;
            let x = scaled
                .get(feature)
                .copied()
                .ok_or_else(|| PredictError::Model(format!("split feature {feature} out of range")))?;
            index = if x <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}

/// The loaded classifier. Exactly one of these families per artifact file.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ClassifierModel {
    /// Averaged per-class leaf distributions.
    RandomForest {
        feature_names: Vec<String>,
        n_features: usize,
        trees: Vec<Tree>,
    },
    /// Summed margin leaves through a sigmoid. Learning rate is baked into
    /// the exported leaf values.
    GradientBoosting {
        feature_names: Vec<String>,
        n_features: usize,
        base_score: f64,
        trees: Vec<Tree>,
    },
    /// Linear fallback family. Predicts fine, but the tree attribution
    /// engine cannot be constructed for it.
    LogisticRegression {
        feature_names: Vec<String>,
        n_features: usize,
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

impl ClassifierModel {
    pub fn model_type(&self) -> &'static str {
        match self {
            Self::RandomForest { .. } => "random_forest",
            Self::GradientBoosting { .. } => "gradient_boosting",
            Self::LogisticRegression { .. } => "logistic_regression",
        }
    }

    pub fn feature_names(&self) -> &[String] {
        match self {
            Self::RandomForest { feature_names, .. }
            | Self::GradientBoosting { feature_names, .. }
            | Self::LogisticRegression { feature_names, .. } => feature_names,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::RandomForest { n_features, .. }
            | Self::GradientBoosting { n_features, .. }
            | Self::LogisticRegression { n_features, .. } => *n_features,
        }
    }

    /// Positive-class probability for one scaled record.
    pub fn prob_malignant(&self, scaled: ArrayView1<f64>) -> Result<f64, PredictError> {
        match self {
            Self::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err(PredictError::Model("forest has no trees".to_string()));
                }
                let mut sum = 0.0;
                for tree in trees {
                    let leaf = tree.leaf_for(scaled)?;
                    sum += leaf.value.get(1).copied().ok_or_else(|| {
                        PredictError::Model("forest leaf missing class distribution".to_string())
                    })?;
                }
                Ok(sum / trees.len() as f64)
            }
            Self::GradientBoosting {
                base_score, trees, ..
            } => {
                let mut margin = *base_score;
                for tree in trees {
                    let leaf = tree.leaf_for(scaled)?;
                    margin += leaf.value.first().copied().ok_or_else(|| {
                        PredictError::Model("boosting leaf missing margin".to_string())
                    })?;
                }
                Ok(sigmoid(margin))
            }
            Self::LogisticRegression {
                coefficients,
                intercept,
                ..
            } => {
                if coefficients.len() != scaled.len() {
                    return Err(PredictError::Model(format!(
                        "coefficient width {} does not match input width {}",
                        coefficients.len(),
                        scaled.len()
                    )));
                }
                let margin: f64 = intercept
                    + coefficients
                        .iter()
                        .zip(scaled.iter())
                        .map(|(c, x)| c * x)
                        .sum::<f64>();
                Ok(sigmoid(margin))
            }
        }
    }
}

impl ClassifierArtifact for ClassifierModel {
    fn predict_class(&self, scaled: ArrayView1<f64>) -> Result<u8, PredictError> {
        Ok((self.prob_malignant(scaled)? > 0.5) as u8)
    }

    fn predict_probability(&self, scaled: ArrayView1<f64>) -> Result<f64, PredictError> {
        self.prob_malignant(scaled)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};
    use ndarray::Array1;

    fn schema_names() -> Vec<String> {
        FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
    }

    /// Depth-1 tree splitting on `feature`: value <= threshold goes left.
    fn stump(feature: i64, threshold: f64, left_value: Vec<f64>, right_value: Vec<f64>) -> Tree {
        let root_value = left_value
            .iter()
            .zip(right_value.iter())
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        Tree {
            nodes: vec![
                TreeNode {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                    value: root_value,
                },
                TreeNode {
                    feature: -2,
                    threshold: 0.0,
                    left: -1,
                    right: -1,
                    value: left_value,
                },
                TreeNode {
                    feature: -2,
                    threshold: 0.0,
                    left: -1,
                    right: -1,
                    value: right_value,
                },
            ],
        }
    }

    fn forest() -> ClassifierModel {
        ClassifierModel::RandomForest {
            feature_names: schema_names(),
            n_features: FEATURE_COUNT,
            trees: vec![
                stump(0, 0.0, vec![0.9, 0.1], vec![0.1, 0.9]),
                stump(0, 0.0, vec![0.86, 0.14], vec![0.14, 0.86]),
            ],
        }
    }

    fn record(first: f64) -> Array1<f64> {
        let mut x = Array1::zeros(FEATURE_COUNT);
        x[0] = first;
        x
    }

    #[test]
    fn test_forest_predict_proba() {
        let model = forest();
        let p = model.prob_malignant(record(1.0).view()).unwrap();
        assert!((p - 0.875).abs() < 1e-12);

        let p = model.prob_malignant(record(-1.0).view()).unwrap();
        assert!((p - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_forest_predict_class() {
        let model = forest();
        assert_eq!(model.predict_class(record(1.0).view()).unwrap(), 1);
        assert_eq!(model.predict_class(record(-1.0).view()).unwrap(), 0);
    }

    #[test]
    fn test_gradient_boosting_sigmoid() {
        let model = ClassifierModel::GradientBoosting {
            feature_names: schema_names(),
            n_features: FEATURE_COUNT,
            base_score: 0.0,
            trees: vec![stump(0, 0.0, vec![-2.0], vec![2.0])],
        };

        let p = model.prob_malignant(record(1.0).view()).unwrap();
        assert!((p - sigmoid(2.0)).abs() < 1e-12);
        assert_eq!(model.predict_class(record(1.0).view()).unwrap(), 1);
        assert_eq!(model.predict_class(record(-1.0).view()).unwrap(), 0);
    }

    #[test]
    fn test_logistic_regression() {
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[0] = 3.0;
        let model = ClassifierModel::LogisticRegression {
            feature_names: schema_names(),
            n_features: FEATURE_COUNT,
            coefficients,
            intercept: -1.0,
        };

        let p = model.prob_malignant(record(1.0).view()).unwrap();
        assert!((p - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_tagged_json_roundtrip() {
        let json = serde_json::to_string(&serde_json::json!({
            "model_type": "random_forest",
            "feature_names": schema_names(),
            "n_features": FEATURE_COUNT,
            "trees": [{ "nodes": [
                { "feature": -2, "threshold": 0.0, "left": -1, "right": -1, "value": [0.3, 0.7] }
            ]}],
        }))
        .unwrap();

        let model: ClassifierModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model.model_type(), "random_forest");
        let p = model.prob_malignant(record(0.0).view()).unwrap();
        assert!((p - 0.7).abs() < 1e-12);
    }
}
