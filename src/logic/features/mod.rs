//! Features Module - Input Schema & Vectors
//!
//! - `layout` - the fixed 30-column diagnostic schema (single source of truth)
//! - `vector` - validated per-record feature values

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{feature_index, feature_name, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::FeatureVector;
