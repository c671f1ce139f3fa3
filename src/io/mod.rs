//! Input/output: configuration, errors, image handling, exports and the CLI

/// Command-line parsing and batch file processing
pub mod cli;
/// Constants and runtime defaults
pub mod configuration;
/// Error types shared across the crate
pub mod error;
/// CSV, SVG and JSON exports
pub mod export;
/// Source raster loading and PNG preview rendering
pub mod image;
/// Terminal progress bars
pub mod progress;
