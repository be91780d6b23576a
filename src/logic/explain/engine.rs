//! Attribution Engine - Decision-Path Contributions
//!
//! Walks each tree's decision path for a record and attributes the change in
//! the node's expected value at every split to the split feature. Summed over
//! the ensemble this yields a local, additive explanation:
//! `base_value + sum(contributions) == model output` for the chosen class.
//!
//! Forests produce a per-class pair of vectors, boosting a single margin-space
//! vector. Both shapes are normalized here, at the boundary, into "one vector
//! plus base value for the predicted class" before anything downstream sees
//! them.

use std::sync::Arc;

use ndarray::ArrayView1;

use super::types::AttributionExplanation;
use crate::logic::artifacts::{ClassifierModel, Tree, TreeNode};
use crate::logic::error::ExplainError;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Raw engine output before class orientation. Resolved exactly once.
enum RawAttribution {
    /// One vector and base per class (index = class).
    PerClass {
        values: [Vec<f64>; 2],
        base: [f64; 2],
    },
    /// Single vector in margin (log-odds) space, oriented toward class 1.
    Margin { values: Vec<f64>, base: f64 },
}

impl RawAttribution {
    /// Orient to the class actually shown to the user. Never defaults to the
    /// positive class: for class 0 the per-class pair selects its class-0
    /// side, and the margin shape is negated (log-odds are antisymmetric).
    fn for_class(self, class: u8) -> (Vec<f64>, f64) {
        match self {
            Self::PerClass { values, base } => {
                let [benign, malignant] = values;
                if class == 1 {
                    (malignant, base[1])
                } else {
                    (benign, base[0])
                }
            }
            Self::Margin { values, base } => {
                if class == 1 {
                    (values, base)
                } else {
                    (values.iter().map(|v| -v).collect(), -base)
                }
            }
        }
    }
}

/// Local explainer over the loaded tree ensemble.
///
/// Construction fails for model families without trees; the pipeline then
/// treats explanation as permanently unavailable for the process lifetime.
#[derive(Debug)]
pub struct TreeExplainer {
    model: Arc<ClassifierModel>,
}

impl TreeExplainer {
    pub fn try_new(model: Arc<ClassifierModel>) -> Result<Self, ExplainError> {
        let (trees, value_width) = match model.as_ref() {
            ClassifierModel::RandomForest { trees, .. } => (trees, 2),
            ClassifierModel::GradientBoosting { trees, .. } => (trees, 1),
            other => return Err(ExplainError::Unsupported(other.model_type().to_string())),
        };

        // Establish the node-value invariant up front so the walks below can
        // index node distributions directly.
        if trees.is_empty() || trees.iter().any(|t| t.nodes.is_empty()) {
            return Err(ExplainError::Failed("model has empty trees".to_string()));
        }
        if trees
            .iter()
            .flat_map(|t| t.nodes.iter())
            .any(|n| n.value.len() != value_width)
        {
            return Err(ExplainError::Failed(
                "tree node values do not match the model family".to_string(),
            ));
        }

        Ok(Self { model })
    }

    /// Compute the attribution for one record, oriented to `predicted_class`.
    ///
    /// Contributions are computed on the scaled input but reported against the
    /// original record; positional alignment to the feature layout is
    /// preserved throughout.
    pub fn explain(
        &self,
        scaled: ArrayView1<f64>,
        original: &FeatureVector,
        predicted_class: u8,
    ) -> Result<AttributionExplanation, ExplainError> {
        let raw = match self.model.as_ref() {
            ClassifierModel::RandomForest { trees, .. } => forest_attribution(trees, scaled)?,
            ClassifierModel::GradientBoosting {
                base_score, trees, ..
            } => boosting_attribution(trees, *base_score, scaled)?,
            other => return Err(ExplainError::Unsupported(other.model_type().to_string())),
        };

        let (contributions, base_value) = raw.for_class(predicted_class);
        Ok(AttributionExplanation {
            contributions,
            base_value,
            feature_values: original.clone(),
        })
    }
}

/// Follow one record's decision path, visiting `(split_feature, from, to)`
/// at every internal node.
fn walk_path<F>(tree: &Tree, scaled: ArrayView1<f64>, mut visit: F) -> Result<(), ExplainError>
where
    F: FnMut(usize, &TreeNode, &TreeNode),
{
    let mut index = 0usize;
    loop {
        let node = tree
            .nodes
            .get(index)
            .ok_or_else(|| ExplainError::Failed(format!("node index {index} out of range")))?;
        if node.is_leaf() {
            return Ok(());
        }

        let feature = node.feature as usize;
        let x = scaled
            .get(feature)
            .copied()
            .ok_or_else(|| ExplainError::Failed(format!("split feature {feature} out of range")))?;
        let child_index = if x <= node.threshold {
            node.left
        } else {
            node.right
        } as usize;
        let child = tree
            .nodes
            .get(child_index)
            .ok_or_else(|| ExplainError::Failed(format!("child index {child_index} out of range")))?;

        visit(feature, node, child);
        index = child_index;
    }
}

fn forest_attribution(
    trees: &[Tree],
    scaled: ArrayView1<f64>,
) -> Result<RawAttribution, ExplainError> {
    let count = trees.len() as f64;
    let mut values = [vec![0.0; FEATURE_COUNT], vec![0.0; FEATURE_COUNT]];
    let mut base = [0.0f64; 2];

    for tree in trees {
        let root = &tree.nodes[0];
        base[0] += root.value[0];
        base[1] += root.value[1];
        walk_path(tree, scaled, |feature, from, to| {
            values[0][feature] += to.value[0] - from.value[0];
            values[1][feature] += to.value[1] - from.value[1];
        })?;
    }

    for class in 0..2 {
        base[class] /= count;
        for v in &mut values[class] {
            *v /= count;
        }
    }
    Ok(RawAttribution::PerClass { values, base })
}

fn boosting_attribution(
    trees: &[Tree],
    base_score: f64,
    scaled: ArrayView1<f64>,
) -> Result<RawAttribution, ExplainError> {
    let mut values = vec![0.0; FEATURE_COUNT];
    let mut base = base_score;

    for tree in trees {
        base += tree.nodes[0].value[0];
        walk_path(tree, scaled, |feature, from, to| {
            values[feature] += to.value[0] - from.value[0];
        })?;
    }
    Ok(RawAttribution::Margin { values, base })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::artifacts::{ClassifierArtifact, TreeNode};
    use crate::logic::features::FEATURE_LAYOUT;
    use ndarray::Array1;

    fn schema_names() -> Vec<String> {
        FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect()
    }

    fn stump(feature: i64, left_value: Vec<f64>, right_value: Vec<f64>) -> Tree {
        let root_value = left_value
            .iter()
            .zip(right_value.iter())
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        Tree {
            nodes: vec![
                TreeNode {
                    feature,
                    threshold: 0.0,
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

    fn forest() -> Arc<ClassifierModel> {
        Arc::new(ClassifierModel::RandomForest {
            feature_names: schema_names(),
            n_features: FEATURE_COUNT,
            trees: vec![
                stump(0, vec![0.9, 0.1], vec![0.1, 0.9]),
                stump(4, vec![0.7, 0.3], vec![0.3, 0.7]),
            ],
        })
    }

    fn record(values: &[(usize, f64)]) -> (Array1<f64>, FeatureVector) {
        let mut x = Array1::zeros(FEATURE_COUNT);
        let mut raw = [0.0f64; FEATURE_COUNT];
        for &(i, v) in values {
            x[i] = v;
            raw[i] = v;
        }
        (x, FeatureVector::from_values(raw))
    }

    #[test]
    fn test_contributions_sum_to_prediction_minus_base() {
        let model = forest();
        let explainer = TreeExplainer::try_new(model.clone()).unwrap();
        let (scaled, raw) = record(&[(0, 1.0), (4, -1.0)]);

        let prob = model.predict_probability(scaled.view()).unwrap();
        let explanation = explainer.explain(scaled.view(), &raw, 1).unwrap();

        let total: f64 = explanation.contributions.iter().sum();
        assert!((explanation.base_value + total - prob).abs() < 1e-12);
    }

    #[test]
    fn test_class_zero_orientation_differs() {
        let model = forest();
        let explainer = TreeExplainer::try_new(model).unwrap();
        let (scaled, raw) = record(&[(0, 1.0)]);

        let malignant = explainer.explain(scaled.view(), &raw, 1).unwrap();
        let benign = explainer.explain(scaled.view(), &raw, 0).unwrap();

        assert_ne!(malignant.contributions, benign.contributions);
        // Binary distributions make the class-0 vector the exact negation
        for (m, b) in malignant.contributions.iter().zip(benign.contributions.iter()) {
            assert!((m + b).abs() < 1e-12);
        }
        assert!((malignant.base_value + benign.base_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_benign_sum_matches_benign_probability() {
        let model = forest();
        let explainer = TreeExplainer::try_new(model.clone()).unwrap();
        let (scaled, raw) = record(&[(0, -1.0), (4, -1.0)]);

        let prob_malignant = model.predict_probability(scaled.view()).unwrap();
        let explanation = explainer.explain(scaled.view(), &raw, 0).unwrap();

        let total: f64 = explanation.contributions.iter().sum();
        assert!((explanation.base_value + total - (1.0 - prob_malignant)).abs() < 1e-12);
    }

    #[test]
    fn test_boosting_margin_attribution() {
        let model = Arc::new(ClassifierModel::GradientBoosting {
            feature_names: schema_names(),
            n_features: FEATURE_COUNT,
            base_score: 0.25,
            trees: vec![stump(3, vec![-1.5], vec![1.5])],
        });
        let explainer = TreeExplainer::try_new(model).unwrap();
        let (scaled, raw) = record(&[(3, 2.0)]);

        let explanation = explainer.explain(scaled.view(), &raw, 1).unwrap();
        // margin = 0.25 + 1.5; base = 0.25 + root(0.0)
        assert!((explanation.base_value - 0.25).abs() < 1e-12);
        assert!((explanation.contributions[3] - 1.5).abs() < 1e-12);

        let benign = explainer.explain(scaled.view(), &raw, 0).unwrap();
        assert!((benign.contributions[3] + 1.5).abs() < 1e-12);
        assert!((benign.base_value + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_model_family() {
        let model = Arc::new(ClassifierModel::LogisticRegression {
            feature_names: schema_names(),
            n_features: FEATURE_COUNT,
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept: 0.0,
        });

        let err = TreeExplainer::try_new(model).unwrap_err();
        assert_eq!(
            err,
            ExplainError::Unsupported("logistic_regression".to_string())
        );
    }
}
