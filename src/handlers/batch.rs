//! CSV batch prediction handler

use axum::extract::{Multipart, State};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::logic::pipeline::{BatchPredictionRunner, CsvTable};
use crate::{AppError, AppResult, AppState};

/// Predict every row of an uploaded CSV (multipart field `file`).
///
/// Responds with the whole output table — original columns plus
/// `AI_Prediction` and `Confidence_Score` — base64-encoded as a single
/// payload, mirroring what the download frontend expects.
pub async fn predict_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<String> {
    let mut file_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(e.to_string()))?
    {
        if field.name() == Some("file") {
            file_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::ValidationError(e.to_string()))?,
            );
        }
    }
    let bytes = file_bytes.ok_or_else(|| AppError::ValidationError("No file".to_string()))?;

    let table = parse_csv(&bytes)?;
    let output = BatchPredictionRunner::new(state.pipeline.clone()).run(table)?;
    let csv_bytes = write_csv(&output)?;

    Ok(BASE64.encode(csv_bytes))
}

fn parse_csv(bytes: &[u8]) -> Result<CsvTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AppError::ValidationError(format!("CSV parse error: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::ValidationError(format!("CSV parse error: {e}")))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(CsvTable { headers, rows })
}

fn write_csv(table: &CsvTable) -> Result<Vec<u8>, AppError> {
    let write_err = |e: csv::Error| AppError::InternalError(format!("CSV write error: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers).map_err(write_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(write_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV write error: {e}")))
}
