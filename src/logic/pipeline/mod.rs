//! Prediction Pipeline - The Core Path
//!
//! Scaler -> Classifier -> ConfidenceResolver -> AttributionExplainer for one
//! record, and the vectorized non-explanation path for batch tables. The
//! pipeline owns no mutable state and persists nothing; history is the
//! caller's responsibility, so the whole path stays a pure function of its
//! inputs plus the two read-only artifacts.

pub mod batch;
pub mod confidence;


use std::sync::Arc;

use ndarray::{aview1, ArrayView2};
use serde::Serialize;

use crate::logic::artifacts::{ClassifierArtifact, ScalerArtifact};
use crate::logic::error::PredictError;
use crate::logic::explain::{AttributionExplanation, TreeExplainer};
use crate::logic::features::FeatureVector;

pub use batch::{BatchPredictionRunner, CsvTable};
pub use confidence::{resolve, DiagnosisLabel};

/// One resolved prediction.
///
/// Invariant: `confidence` is certainty in `label` — equal to
/// `prob_malignant` when `raw_class == 1`, else `1 - prob_malignant`.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub raw_class: u8,
    pub prob_malignant: f64,
    pub label: DiagnosisLabel,
    pub confidence: f64,
}

/// The prediction-and-explanation pipeline.
///
/// Artifacts are injected once at startup and shared read-only; the pipeline
/// is safe for unlimited concurrent use without locking. The explainer is
/// constructed once — when the model family doesn't support attribution it is
/// `None` for the process lifetime and explanation is never attempted.
pub struct PredictionPipeline {
    scaler: Arc<dyn ScalerArtifact>,
    classifier: Arc<dyn ClassifierArtifact>,
    explainer: Option<TreeExplainer>,
}

impl PredictionPipeline {
    pub fn new(
        scaler: Arc<dyn ScalerArtifact>,
        classifier: Arc<dyn ClassifierArtifact>,
        explainer: Option<TreeExplainer>,
    ) -> Self {
        Self {
            scaler,
            classifier,
            explainer,
        }
    }

    pub fn has_explainer(&self) -> bool {
        self.explainer.is_some()
    }

    /// Predict one record.
    ///
    /// Schema validity is guaranteed by `FeatureVector` construction. An
    /// explanation failure never aborts the prediction: the result is
    /// returned with the explanation absent and a warning logged.
    pub fn predict(
        &self,
        features: &FeatureVector,
    ) -> Result<(Prediction, Option<AttributionExplanation>), PredictError> {
        let scaled = self.scaler.transform(aview1(features.as_slice()))?;

        let raw_class = self.classifier.predict_class(scaled.view())?;
        let prob_malignant = self.classifier.predict_probability(scaled.view())?;
        let (label, confidence) = confidence::resolve(raw_class, prob_malignant);

        let prediction = Prediction {
            raw_class,
            prob_malignant,
            label,
            confidence,
        };

        let explanation = match &self.explainer {
            Some(explainer) => match explainer.explain(scaled.view(), features, raw_class) {
                Ok(explanation) => Some(explanation),
                Err(e) => {
                    tracing::warn!(error = %e, "explanation failed, returning prediction without it");
                    None
                }
            },
            None => None,
        };

        Ok((prediction, explanation))
    }

    /// Vectorized non-explanation path: scaler and classifier applied across
    /// the whole table, resolver per row. Output order equals input order.
    pub fn predict_batch(&self, rows: ArrayView2<f64>) -> Result<Vec<Prediction>, PredictError> {
        let scaled = self.scaler.transform_batch(rows)?;

        let mut predictions = Vec::with_capacity(scaled.nrows());
        for row in scaled.rows() {
            let raw_class = self.classifier.predict_class(row)?;
            let prob_malignant = self.classifier.predict_probability(row)?;
            let (label, confidence) = confidence::resolve(raw_class, prob_malignant);
            predictions.push(Prediction {
                raw_class,
                prob_malignant,
                label,
                confidence,
            });
        }
        Ok(predictions)
    }
}
