//! Worker boundary around the execution loop
//!
//! - Message protocol for run/pause/resume/cancel and status/progress/result
//! - Shared pause and cancel state with condition-variable wakeups
//! - Thread handle that hosts runs off the controlling thread

/// Pause/cancel flags and the per-run control ticket
pub mod control;
/// Worker thread handle
pub mod handle;
/// Request and event messages
pub mod protocol;

pub use handle::Worker;
pub use protocol::{Event, Request, RunRequest, WorkerState};
