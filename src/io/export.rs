//! Text exports of a finished run: CSV step table, SVG drawing, JSON result
//! and the parameter preset that reproduces it

use crate::algorithm::engine::StepRecord;
use crate::io::configuration::{DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH};
use crate::io::error::{Result, file_system};
use crate::spatial::pins::Pin;
use crate::worker::protocol::ResultEvent;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Stroke appearance for vector export
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// CSS color of every string
    pub color: String,
    /// Stroke width in raster pixels
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_STROKE_COLOR.to_string(),
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Step table with one row per accepted step
///
/// Columns: `step,fromPin,toPin,length,score,deltaError`, where `length` is
/// the Euclidean chord length in raster pixels.
pub fn steps_csv(steps: &[StepRecord], pins: &[Pin]) -> String {
    let mut csv = String::from("step,fromPin,toPin,length,score,deltaError\n");
    for step in steps {
        let length = match (pins.get(step.from), pins.get(step.to)) {
            (Some(a), Some(b)) => a.distance_to(b),
            _ => 0.0,
        };
        let _ = writeln!(
            csv,
            "{},{},{},{length:.2},{:.4},{}",
            step.index, step.from, step.to, step.score, step.delta_error
        );
    }
    csv
}

/// SVG drawing with one `<line>` per chord, clipped to the board circle
pub fn path_svg(size: usize, pins: &[Pin], path: &[usize], stroke: &StrokeStyle) -> String {
    let half = size as f64 / 2.0;
    let clip_radius = half - 8.0;

    let mut lines = String::new();
    for pair in path.windows(2) {
        let (Some(a), Some(b)) = (
            pair.first().and_then(|&i| pins.get(i)),
            pair.get(1).and_then(|&i| pins.get(i)),
        ) else {
            continue;
        };
        let _ = writeln!(
            lines,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" />"#,
            a.x, a.y, b.x, b.y
        );
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">
<defs><clipPath id="c"><circle cx="{half}" cy="{half}" r="{clip_radius}"/></clipPath></defs>
<g clip-path="url(#c)" stroke="{color}" stroke-width="{width}" stroke-linecap="round" stroke-linejoin="round">
{lines}</g>
</svg>
"#,
        color = stroke.color,
        width = stroke.width,
    )
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(file_system(parent, "create directory"))?;
    }
    std::fs::write(path, contents).map_err(file_system(path, "write"))
}

/// Write the step table to `path`
///
/// # Errors
///
/// Returns [`crate::StringArtError::FileSystem`] if the file cannot be
/// written.
pub fn export_csv(steps: &[StepRecord], pins: &[Pin], path: &Path) -> Result<()> {
    write_text(path, &steps_csv(steps, pins))
}

/// Write the SVG drawing to `path`
///
/// # Errors
///
/// Returns [`crate::StringArtError::FileSystem`] if the file cannot be
/// written.
pub fn export_svg(
    size: usize,
    pins: &[Pin],
    pin_path: &[usize],
    stroke: &StrokeStyle,
    path: &Path,
) -> Result<()> {
    write_text(path, &path_svg(size, pins, pin_path, stroke))
}

/// Write the result event as pretty-printed JSON to `path`
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn export_json(result: &ResultEvent, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    write_text(path, &json)
}

/// Run and drawing parameters saved alongside a result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Number of pins around the board
    pub pins: usize,
    /// Maximum number of strings
    pub strings: usize,
    /// Minimum pin index distance between connected pins
    pub min_dist: usize,
    /// Brightness each string removes from the residual
    pub fade: u32,
    /// Stroke width in raster pixels
    pub width_px: f64,
    /// String opacity (0-255)
    pub alpha: u8,
    /// CSS color of every string
    pub color: String,
    /// Board background
    pub board: String,
}

/// Write the preset as pretty-printed JSON to `path`
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
pub fn export_preset(preset: &Preset, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(preset)?;
    write_text(path, &json)
}
