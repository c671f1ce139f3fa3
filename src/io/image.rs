//! Source raster preparation and PNG preview rendering

use crate::io::error::{Result, StringArtError, file_system};
use crate::spatial::line::chord_pixels;
use crate::spatial::pins::{Pin, board_radius};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use std::path::Path;

/// Load an image file as a square grayscale working raster
///
/// # Errors
///
/// Returns [`StringArtError::ImageLoad`] if the file cannot be decoded.
pub fn load_raster(path: &Path, size: usize) -> Result<Vec<u8>> {
    let image = image::open(path).map_err(|source| StringArtError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(prepare_raster(&image, size))
}

/// Convert an image into the engine's `size x size` grayscale layout
///
/// Takes the centered square crop, resizes it, and paints everything outside
/// the board circle white so no string is drawn toward the corners.
pub fn prepare_raster(image: &DynamicImage, size: usize) -> Vec<u8> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    let side = width.min(height);
    if side == 0 {
        return vec![u8::MAX; size * size];
    }
    let square = imageops::crop_imm(&gray, (width - side) / 2, (height - side) / 2, side, side)
        .to_image();

    let side_px = size as u32;
    let mut resized = imageops::resize(&square, side_px, side_px, FilterType::Triangle);

    let center = size as f64 / 2.0;
    let radius = board_radius(size);
    for (x, y, pixel) in resized.enumerate_pixels_mut() {
        let dx = f64::from(x) + 0.5 - center;
        let dy = f64::from(y) + 0.5 - center;
        if dx.hypot(dy) > radius {
            *pixel = Luma([u8::MAX]);
        }
    }

    resized.into_raw()
}

/// Render a path of pins as dark strings on a white board
///
/// Each chord darkens the pixels it crosses by `alpha / 255`, so overlapping
/// strings build up tone the way thread does.
pub fn render_path(size: usize, pins: &[Pin], path: &[usize], alpha: u8) -> GrayImage {
    let side = size as u32;
    let mut image = GrayImage::from_pixel(side, side, Luma([u8::MAX]));
    let keep = f64::from(u8::MAX - alpha) / f64::from(u8::MAX);

    for pair in path.windows(2) {
        let (Some(from), Some(to)) = (
            pair.first().and_then(|&i| pins.get(i)),
            pair.get(1).and_then(|&i| pins.get(i)),
        ) else {
            continue;
        };
        for [x, y] in chord_pixels(from, to) {
            let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) else {
                continue;
            };
            if let Some(pixel) = image.get_pixel_mut_checked(px, py) {
                let value = f64::from(pixel.0[0]) * keep;
                pixel.0[0] = value.round() as u8;
            }
        }
    }

    image
}

/// Render a path and save it as a PNG preview
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the image
/// cannot be written.
pub fn export_preview_png(
    size: usize,
    pins: &[Pin],
    path: &[usize],
    alpha: u8,
    output_path: &Path,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(file_system(parent, "create directory"))?;
    }

    render_path(size, pins, path, alpha)
        .save(output_path)
        .map_err(|e| StringArtError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
