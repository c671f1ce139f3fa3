//! Circular pin layout around a square raster
//!
//! Pins sit evenly spaced on a circle centered on the raster, inset from the
//! raster edge by [`BOARD_MARGIN`]. The layout is a pure function of size and
//! pin count, so every consumer (engine, exporters, previews) can rebuild it.

use crate::io::configuration::BOARD_MARGIN;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Fixed anchor point on the board that strings connect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pin {
    /// Index of the pin on the circle, `0..count`
    pub id: usize,
    /// Horizontal raster coordinate
    pub x: i32,
    /// Vertical raster coordinate
    pub y: i32,
}

impl Pin {
    /// Coordinates as an `[x, y]` pair
    pub const fn position(&self) -> [i32; 2] {
        [self.x, self.y]
    }

    /// Euclidean distance to another pin in raster pixels
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

/// Radius of the pin circle for a raster of the given side length
pub fn board_radius(size: usize) -> f64 {
    size as f64 / 2.0 - f64::from(BOARD_MARGIN)
}

/// Place `count` pins evenly on the board circle
///
/// Pin `i` sits at angle `i * 2π / count`, measured from the positive x axis,
/// with coordinates rounded to the nearest pixel. An empty layout is returned
/// for `count == 0`.
pub fn generate_pins(size: usize, count: usize) -> Vec<Pin> {
    if count == 0 {
        return Vec::new();
    }

    let center = size as f64 / 2.0;
    let radius = board_radius(size);
    let step = TAU / count as f64;

    (0..count)
        .map(|id| {
            let angle = id as f64 * step;
            Pin {
                id,
                x: (center + radius * angle.cos()).round() as i32,
                y: (center + radius * angle.sin()).round() as i32,
            }
        })
        .collect()
}

/// Circular index distance between two pins on a board of `count` pins
///
/// Wraps around the circle, so pins `0` and `count - 1` are neighbours.
pub const fn circular_distance(a: usize, b: usize, count: usize) -> usize {
    let direct = a.abs_diff(b);
    let wrapped = count.saturating_sub(direct);
    if direct < wrapped { direct } else { wrapped }
}
