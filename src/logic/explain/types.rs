use serde::Serialize;

use crate::logic::features::{feature_name, FeatureVector};

/// Per-feature attribution for one prediction, oriented to the predicted
/// class. `contributions` is positionally aligned to the feature layout.
#[derive(Debug, Clone, Serialize)]
pub struct AttributionExplanation {
    pub contributions: Vec<f64>,
    pub base_value: f64,
    /// The original (unscaled) record the contributions refer to.
    pub feature_values: FeatureVector,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureContribution {
    pub name: &'static str,
    /// Original feature value, shown alongside the contribution
    pub value: f64,
    pub contribution: f64,
}

impl AttributionExplanation {
    /// Strongest `limit` contributions by magnitude, descending.
    pub fn top_contributions(&self, limit: usize) -> Vec<FeatureContribution> {
        let mut ranked: Vec<usize> = (0..self.contributions.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.contributions[b]
                .abs()
                .partial_cmp(&self.contributions[a].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        ranked
            .into_iter()
            .take(limit)
            .filter_map(|i| {
                Some(FeatureContribution {
                    name: feature_name(i)?,
                    value: self.feature_values.get(i)?,
                    contribution: self.contributions[i],
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;

    #[test]
    fn test_top_contributions_ranking() {
        let mut contributions = vec![0.0; FEATURE_COUNT];
        contributions[2] = 0.4;
        contributions[5] = -0.9;
        contributions[11] = 0.1;

        let explanation = AttributionExplanation {
            contributions,
            base_value: 0.5,
            feature_values: FeatureVector::from_values([1.0; FEATURE_COUNT]),
        };

        let top = explanation.top_contributions(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "compactness_mean");
        assert_eq!(top[0].contribution, -0.9);
        assert_eq!(top[1].name, "perimeter_mean");
    }
}
