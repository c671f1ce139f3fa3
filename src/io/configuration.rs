//! Engine constants and runtime configuration defaults

// Board geometry
/// Distance in pixels between the raster edge and the pin circle
pub const BOARD_MARGIN: i32 = 16;

// Default values for configurable parameters
/// Number of pins placed around the board
pub const DEFAULT_PINS: usize = 240;

/// Maximum number of strings (steps) in a run
pub const DEFAULT_STRINGS: usize = 3000;

/// Minimum circular index distance between connected pins
pub const DEFAULT_MIN_DIST: usize = 15;

/// Brightness added to each residual pixel a chosen chord covers
pub const DEFAULT_FADE: u32 = 50;

/// Side length of the square working raster
pub const DEFAULT_SIZE: usize = 1440;

// Input limits
/// Largest accepted pin count; the used-pair set grows with its square
pub const MAX_PINS: usize = 4096;

/// Largest accepted raster side length
pub const MAX_SIZE: usize = 8192;

// Execution loop pacing
/// Fraction of `max_steps` that must elapse between progress reports
pub const PROGRESS_THROTTLE: f64 = 0.02;

/// Completed steps between cooperative yields
pub const YIELD_STRIDE: usize = 512;

/// Lower bound on the preview stride, as a fraction of `max_steps`
pub const MIN_PREVIEW_FRACTION: f64 = 0.04;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_strings";
/// File extensions accepted as source images
pub const SOURCE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];
/// Stroke color used for SVG and PNG exports
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
/// Stroke width in raster pixels for SVG export
pub const DEFAULT_STROKE_WIDTH: f64 = 0.8;
/// Opacity (0-255) of a single string in exports
pub const DEFAULT_STROKE_ALPHA: u8 = 180;
/// Board background recorded in presets
pub const DEFAULT_BOARD: &str = "white";
