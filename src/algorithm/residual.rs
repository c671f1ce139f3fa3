//! Residual ink budget of the source raster
//!
//! Each pixel holds how bright the board still is at that point: 0 means
//! darkness that no string has represented yet, 255 means nothing left to
//! cover. Chords only ever brighten the residual, so its total is
//! monotonically non-decreasing across a run.

use crate::io::error::{Result, unsupported_raster};
use ndarray::Array2;

/// Brightest representable residual value
pub const WHITE: f32 = 255.0;

/// Borrowed source raster in one of the accepted pixel layouts
#[derive(Clone, Copy, Debug)]
pub enum Raster<'a> {
    /// One byte per pixel, row-major
    Gray(&'a [u8]),
    /// Four bytes per pixel, row-major; only the red channel is read
    Rgba(&'a [u8]),
}

impl Raster<'_> {
    fn to_luma(self, size: usize) -> Result<Vec<f32>> {
        if size == 0 {
            return Err(unsupported_raster(&"raster size must be positive"));
        }
        let too_large = || unsupported_raster(&format!("raster size {size} is too large"));
        let pixels = size.checked_mul(size).ok_or_else(too_large)?;
        let rgba_bytes = pixels.checked_mul(4).ok_or_else(too_large)?;
        match self {
            Self::Gray(bytes) if bytes.len() == pixels => {
                Ok(bytes.iter().map(|&v| f32::from(v)).collect())
            }
            Self::Rgba(bytes) if bytes.len() == rgba_bytes => Ok(bytes
                .chunks_exact(4)
                .map(|px| px.first().copied().map_or(WHITE, f32::from))
                .collect()),
            Self::Gray(bytes) => Err(unsupported_raster(&format!(
                "expected {pixels} grayscale bytes for a {size}x{size} raster, got {}",
                bytes.len()
            ))),
            Self::Rgba(bytes) => Err(unsupported_raster(&format!(
                "expected {rgba_bytes} RGBA bytes for a {size}x{size} raster, got {}",
                bytes.len()
            ))),
        }
    }
}

/// Per-pixel residual brightness, indexed `[row, col]` i.e. `[y, x]`
#[derive(Clone, Debug)]
pub struct ResidualImage {
    values: Array2<f32>,
    size: usize,
    total: f64,
}

impl ResidualImage {
    /// Copy a source raster into a fresh residual image
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::UnsupportedRaster`] if `size` is zero
    /// or the buffer length does not match `size * size` pixels.
    pub fn from_raster(raster: Raster<'_>, size: usize) -> Result<Self> {
        let luma = raster.to_luma(size)?;
        let total = luma.iter().map(|&v| f64::from(v)).sum();
        let values = Array2::from_shape_vec((size, size), luma)
            .map_err(|e| unsupported_raster(&e))?;
        Ok(Self {
            values,
            size,
            total,
        })
    }

    /// Side length of the square raster
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Residual value at `(x, y)`, if inside the raster
    pub fn value(&self, x: usize, y: usize) -> Option<f32> {
        self.values.get((y, x)).copied()
    }

    /// Underlying residual array
    pub const fn values(&self) -> &Array2<f32> {
        &self.values
    }

    // Chord coordinates are unclamped; pins near the edge may step outside
    fn clamp(&self, [x, y]: [i32; 2]) -> (usize, usize) {
        let max = self.size.saturating_sub(1) as i32;
        (y.clamp(0, max) as usize, x.clamp(0, max) as usize)
    }

    /// Mean remaining darkness (`255 - residual`) along a pixel path
    ///
    /// Returns `0.0` for an empty path.
    pub fn mean_darkness(&self, pixels: &[[i32; 2]]) -> f64 {
        if pixels.is_empty() {
            return 0.0;
        }
        let sum: f64 = pixels
            .iter()
            .map(|&px| {
                let value = self.values.get(self.clamp(px)).copied().unwrap_or(WHITE);
                f64::from(WHITE - value)
            })
            .sum();
        sum / pixels.len() as f64
    }

    /// Brighten every pixel on the path by `amount`, saturating at white
    ///
    /// Returns the change in [`Self::sum`], never negative.
    pub fn fade(&mut self, pixels: &[[i32; 2]], amount: u32) -> f64 {
        let amount = amount as f32;
        let mut delta = 0.0;
        for &px in pixels {
            let index = self.clamp(px);
            if let Some(value) = self.values.get_mut(index) {
                let faded = (*value + amount).min(WHITE);
                delta += f64::from(faded - *value);
                *value = faded;
            }
        }
        self.total += delta;
        delta
    }

    /// Total of all residual values
    ///
    /// Kept up to date incrementally by [`Self::fade`].
    pub const fn sum(&self) -> f64 {
        self.total
    }

    /// Recompute the total from scratch
    pub fn recompute_sum(&self) -> f64 {
        self.values.iter().map(|&v| f64::from(v)).sum()
    }
}
