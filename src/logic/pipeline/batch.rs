//! Batch Prediction Runner
//!
//! Applies the pipeline's non-explanation path across an uploaded table and
//! appends the two result columns. No attribution for batches; explanation is
//! a single-record feature.

use std::sync::Arc;

use ndarray::Array2;

use super::PredictionPipeline;
use crate::logic::error::{PredictError, SchemaError};
use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};

/// Appended result columns.
pub const PREDICTION_COLUMN: &str = "AI_Prediction";
pub const CONFIDENCE_COLUMN: &str = "Confidence_Score";

/// A parsed delimited table: header row plus string cells. Non-schema
/// columns ride along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub struct BatchPredictionRunner {
    pipeline: Arc<PredictionPipeline>,
}

impl BatchPredictionRunner {
    pub fn new(pipeline: Arc<PredictionPipeline>) -> Self {
        Self { pipeline }
    }

    /// Predict every row of `table` and return it with `AI_Prediction` and
    /// `Confidence_Score` columns appended. Row count and order are preserved
    /// exactly.
    pub fn run(&self, table: CsvTable) -> Result<CsvTable, PredictError> {
        // Header must be a superset of the schema; report every missing
        // column at once, not just the first.
        let missing: Vec<String> = FEATURE_LAYOUT
            .iter()
            .filter(|&&name| !table.headers.iter().any(|h| h == name))
            .map(|&name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing).into());
        }

        let column_of: Vec<usize> = FEATURE_LAYOUT
            .iter()
            .filter_map(|&name| table.headers.iter().position(|h| h == name))
            .collect();
        debug_assert_eq!(column_of.len(), FEATURE_COUNT);

        let mut matrix = Array2::zeros((table.rows.len(), FEATURE_COUNT));
        for (r, row) in table.rows.iter().enumerate() {
            for (i, &col) in column_of.iter().enumerate() {
                let cell = row.get(col).map(|s| s.trim()).unwrap_or("");
                matrix[[r, i]] = cell.parse().map_err(|_| SchemaError::InvalidValue {
                    column: FEATURE_LAYOUT[i].to_string(),
                    row: r + 1,
                    value: cell.to_string(),
                })?;
            }
        }

        let predictions = self.pipeline.predict_batch(matrix.view())?;

        let mut headers = table.headers;
        headers.push(PREDICTION_COLUMN.to_string());
        headers.push(CONFIDENCE_COLUMN.to_string());

        let rows = table
            .rows
            .into_iter()
            .zip(predictions)
            .map(|(mut row, prediction)| {
                row.push(prediction.label.as_str().to_string());
                row.push(format!("{:.2}%", prediction.confidence * 100.0));
                row
            })
            .collect();

        Ok(CsvTable { headers, rows })
    }
}
