//! Greedy string art generation
//!
//! Pins are placed on a circle around a grayscale image and a single thread is
//! routed between them one chord at a time, always picking the chord that
//! crosses the most remaining darkness. The run can be hosted on a worker
//! thread and paused, resumed or canceled between steps.

#![forbid(unsafe_code)]

/// Residual model, greedy step engine and execution loop
pub mod algorithm;
/// Input/output operations and error handling
pub mod io;
/// Pin layout and chord rasterization
pub mod spatial;
/// Worker thread and its message protocol
pub mod worker;

pub use io::error::{Result, StringArtError};
