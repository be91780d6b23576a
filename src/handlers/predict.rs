//! Single prediction handler

use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json, RequestExt};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::logic::explain::render_waterfall;
use crate::logic::features::FeatureVector;
use crate::models::Patient;
use crate::{AppError, AppResult, AppState};

/// JSON request body: feature values in schema order.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub data: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: u8,
    /// Confidence in the returned label (already oriented)
    pub probability: f64,
    pub label: String,
    /// Base64 PNG; absent when the explainer is unavailable or failed
    pub explanation_image: Option<String>,
}

/// Predict one record supplied as JSON (`{"data": [...]}`) or as
/// form-encoded fields named by the schema.
pub async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<PredictResponse>> {
    let features = extract_features(request).await?;

    let (prediction, explanation) = state.pipeline.predict(&features)?;

    // Persist history only after the pipeline succeeded
    Patient::insert(
        &state.pool,
        prediction.label.as_str(),
        prediction.confidence,
        features.radius_mean(),
        features.area_mean(),
    )
    .await?;

    // Rendering is blocking (file-backed bitmap), so keep it off the runtime.
    // Any failure here degrades to "no image"; the prediction stands.
    let explanation_image = match explanation {
        Some(explanation) => {
            let label = prediction.label;
            tokio::task::spawn_blocking(move || render_waterfall(&explanation, label.as_str()))
                .await
                .ok()
                .and_then(|result| match result {
                    Ok(png) => Some(BASE64.encode(png)),
                    Err(e) => {
                        tracing::warn!(error = %e, "explanation render failed");
                        None
                    }
                })
        }
        None => None,
    };

    Ok(Json(PredictResponse {
        prediction: prediction.raw_class,
        probability: prediction.confidence,
        label: prediction.label.as_str().to_string(),
        explanation_image,
    }))
}

async fn extract_features(request: Request) -> Result<FeatureVector, AppError> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    if is_json {
        let Json(body): Json<PredictRequest> = request
            .extract()
            .await
            .map_err(|e: axum::extract::rejection::JsonRejection| {
                AppError::ValidationError(e.to_string())
            })?;
        FeatureVector::from_ordered(&body.data).map_err(|e| AppError::ValidationError(e.to_string()))
    } else {
        let Form(fields): Form<HashMap<String, String>> = request
            .extract()
            .await
            .map_err(|e: axum::extract::rejection::FormRejection| {
                AppError::ValidationError(e.to_string())
            })?;
        FeatureVector::from_named(&fields).map_err(|e| AppError::ValidationError(e.to_string()))
    }
}
