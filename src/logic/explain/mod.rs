//! Explain Module - Local Feature Attribution
//!
//! - `engine` - decision-path attribution over the loaded tree ensemble
//! - `types` - the explanation data handed to callers and the renderer
//! - `render` - waterfall chart rendering (PNG bytes)

pub mod engine;
pub mod render;
pub mod types;

pub use engine::TreeExplainer;
pub use render::render_waterfall;
pub use types::{AttributionExplanation, FeatureContribution};
