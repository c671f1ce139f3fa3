//! Board geometry
//!
//! This module contains the geometric building blocks of a run:
//! - Pin placement on the board circle
//! - Integer chord rasterization between pins

/// Integer line walk and chord pixel paths
pub mod line;
/// Pin layout generation and circular index distance
pub mod pins;

pub use pins::{Pin, generate_pins};
