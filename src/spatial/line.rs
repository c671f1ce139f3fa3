//! Integer line rasterization between pins

use crate::spatial::pins::Pin;

/// Walk the integer pixels from `start` to `end` inclusive
///
/// Classic Bresenham error accumulation: runs in time proportional to the
/// Chebyshev distance between the endpoints and never emits the same pixel
/// twice in a row. Coordinates are returned unclamped.
pub fn line_walk(start: [i32; 2], end: [i32; 2]) -> Vec<[i32; 2]> {
    let [mut x, mut y] = start;
    let [x1, y1] = end;

    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut pixels = Vec::with_capacity(dx.max(dy) as usize + 1);
    loop {
        pixels.push([x, y]);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = err * 2;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    pixels
}

/// Pixels of the chord connecting two pins
///
/// The walk always runs from the lower pin index to the higher one, so both
/// argument orders cover exactly the same pixels; the swapped call returns
/// the path reversed.
pub fn chord_pixels(a: &Pin, b: &Pin) -> Vec<[i32; 2]> {
    if a.id <= b.id {
        line_walk(a.position(), b.position())
    } else {
        let mut pixels = line_walk(b.position(), a.position());
        pixels.reverse();
        pixels
    }
}
