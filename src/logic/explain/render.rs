//! Explanation rendering collaborator
//!
//! Draws the strongest contributions as a signed horizontal bar chart and
//! returns the encoded PNG bytes. Failures here stay inside the non-fatal
//! explanation path; the prediction itself is never affected.

use std::fs;
use std::path::Path;

use plotters::prelude::*;
use uuid::Uuid;

use super::types::{AttributionExplanation, FeatureContribution};
use crate::logic::error::ExplainError;

const MAX_DISPLAY: usize = 8;
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// Render the top contributions for one explanation as PNG bytes.
pub fn render_waterfall(
    explanation: &AttributionExplanation,
    label: &str,
) -> Result<Vec<u8>, ExplainError> {
    let rows = explanation.top_contributions(MAX_DISPLAY);
    if rows.is_empty() {
        return Err(ExplainError::Failed("no contributions to draw".to_string()));
    }

    // The bitmap backend encodes on file output; render to a temp path and
    // read the bytes back.
    let path = std::env::temp_dir().join(format!("oncodx-explain-{}.png", Uuid::new_v4()));
    let result = draw_chart(&path, &rows, label)
        .map_err(|e| ExplainError::Failed(e.to_string()))
        .and_then(|_| {
            fs::read(&path).map_err(|e| ExplainError::Failed(format!("read chart: {e}")))
        });
    let _ = fs::remove_file(&path);
    result
}

fn draw_chart(
    path: &Path,
    rows: &[FeatureContribution],
    label: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_abs = rows
        .iter()
        .map(|r| r.contribution.abs())
        .fold(f64::EPSILON, f64::max);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Factors driving '{label}' diagnosis"),
            ("sans-serif", 22),
        )
        .margin(10)
        .x_label_area_size(32)
        .y_label_area_size(230)
        .build_cartesian_2d(-max_abs * 1.15..max_abs * 1.15, 0..rows.len() as i32)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(rows.len())
        .y_label_formatter(&|idx: &i32| {
            rows.get(*idx as usize)
                .map(|r| format!("{} = {:.3}", r.name, r.value))
                .unwrap_or_default()
        })
        .x_desc("contribution toward diagnosis")
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let color = if r.contribution >= 0.0 {
            RED.mix(0.8).filled()
        } else {
            BLUE.mix(0.8).filled()
        };
        Rectangle::new([(0.0, i as i32), (r.contribution, i as i32 + 1)], color)
    }))?;

    root.present()?;
    Ok(())
}
