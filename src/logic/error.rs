//! Core error taxonomy
//!
//! `SchemaError` and `PredictError` are recoverable at the request boundary.
//! `ExplainError` never fails a prediction; the pipeline degrades to
//! "no explanation" and logs a warning.

use thiserror::Error;

/// Input does not match the fitted feature schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("expected {expected} feature values, got {actual}")]
    WrongArity { expected: usize, actual: usize },

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid numeric value for '{column}' (row {row}): '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

/// Pipeline failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("scaler rejected input: {0}")]
    Transform(String),

    #[error("classifier failed: {0}")]
    Model(String),
}

/// Attribution failure. Strictly non-fatal for predictions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExplainError {
    #[error("attribution is not supported for model type '{0}'")]
    Unsupported(String),

    #[error("attribution failed: {0}")]
    Failed(String),
}
