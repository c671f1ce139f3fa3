//! Messages exchanged between a controller and the worker
//!
//! Both directions use an adjacently tagged JSON shape,
//! `{"type": "...", "data": {...}}`, so the same messages can cross a thread,
//! process or browser worker boundary unchanged.

use crate::algorithm::engine::StepRecord;
use crate::algorithm::executor::{ProgressReport, RunOptions, RunOutcome};
use crate::io::configuration::{PROGRESS_THROTTLE, YIELD_STRIDE};
use crate::io::error::Result;
use crate::spatial::pins::Pin;
use serde::{Deserialize, Serialize};

/// Controller to worker message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Request {
    /// Start a run, superseding any active one
    Run(RunRequest),
    /// Hold the active run before its next step
    Pause,
    /// Release a paused run
    Resume,
    /// Stop the active run without a result
    Cancel,
}

/// Parameters and source raster of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Side length of the square raster
    pub size: usize,
    /// Brightness added per pixel of a chosen chord
    pub fade: u32,
    /// Minimum circular index distance between connected pins
    pub min_dist: usize,
    /// Upper bound on the number of steps
    pub max_steps: usize,
    /// Row-major grayscale bytes, `size * size` long
    pub raster: Vec<u8>,
    /// Number of pins on the board
    pub pins: usize,
}

impl RunRequest {
    /// Loop options for this request
    ///
    /// The step budget is clamped to at least one.
    pub fn options(&self) -> RunOptions {
        RunOptions {
            size: self.size,
            fade: self.fade,
            min_dist: self.min_dist,
            max_steps: self.max_steps.max(1),
            progress_throttle: PROGRESS_THROTTLE,
            yield_stride: YIELD_STRIDE,
        }
    }
}

/// Externally visible state of the worker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// A run is executing
    Running,
    /// The active run is held before its next step
    Paused,
    /// The active run was canceled
    Canceled,
}

/// Worker to controller message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Event {
    /// Control state changed
    Status {
        /// New state
        state: WorkerState,
    },
    /// Throttled run progress
    Progress(ProgressEvent),
    /// Final output of a completed run
    Result(ResultEvent),
    /// The run could not start
    Error {
        /// Human readable failure
        message: String,
    },
}

/// Throttled progress of the active run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Steps completed so far
    pub step: usize,
    /// Step budget of the run
    pub max: usize,
    /// Score of the latest step
    pub score: f64,
    /// `step / max`
    pub progress: f64,
    /// Pin path snapshot, on preview strides only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<usize>>,
    /// Raster size, sent alongside path snapshots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Pin layout, sent with the first snapshot only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pins: Option<Vec<Pin>>,
}

impl ProgressEvent {
    /// Convert a loop report into a wire event
    pub fn from_report(report: &ProgressReport, size: usize) -> Self {
        Self {
            step: report.step,
            max: report.max_steps,
            score: report.score,
            progress: report.fraction,
            steps: report.path.clone(),
            size: report.path.is_some().then_some(size),
            pins: report.pins.clone(),
        }
    }
}

/// Complete output of a non-canceled run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEvent {
    /// Full pin path, starting at pin 0
    pub steps: Vec<usize>,
    /// Final residual sum
    pub residual: f64,
    /// Run duration in milliseconds
    pub duration_ms: u64,
    /// Pin layout
    pub pins: Vec<Pin>,
    /// Raster size
    pub size: usize,
    /// Per-step details, in path order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<StepRecord>,
}

impl From<&RunOutcome> for ResultEvent {
    fn from(outcome: &RunOutcome) -> Self {
        Self {
            steps: outcome.path(),
            residual: outcome.final_residual,
            duration_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            pins: outcome.pins.clone(),
            size: outcome.size,
            records: outcome.steps.clone(),
        }
    }
}

impl Request {
    /// Decode a request from its JSON form
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::Serialization`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the request as JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Event {
    /// Decode an event from its JSON form
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::Serialization`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the event as JSON
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
