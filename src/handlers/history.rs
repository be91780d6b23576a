//! Prediction history handler

use axum::extract::State;
use axum::Json;

use crate::models::{HistoryEntry, Patient};
use crate::{AppResult, AppState};

const HISTORY_LIMIT: i64 = 10;

/// Up to the 10 most recent predictions, most recent first.
pub async fn get_history(State(state): State<AppState>) -> AppResult<Json<Vec<HistoryEntry>>> {
    let records = Patient::recent(&state.pool, HISTORY_LIMIT).await?;
    Ok(Json(
        records
            .into_iter()
            .map(Patient::into_history_entry)
            .collect(),
    ))
}
