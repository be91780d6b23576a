//! Logic Module - The Inference Core
//!
//! - `features/` - input schema and validated feature vectors
//! - `artifacts/` - pre-trained scaler/classifier loading (startup only)
//! - `pipeline/` - prediction pipeline, confidence resolver, batch runner
//! - `explain/` - decision-path attribution and chart rendering
//!
//! Everything here is free of I/O except artifact loading; request handling
//! and history persistence live in the surrounding web layer.

pub mod artifacts;
pub mod error;
pub mod explain;
pub mod features;
pub mod pipeline;
