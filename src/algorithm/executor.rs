//! Cooperative execution loop around the step engine
//!
//! The loop owns one [`StepEngine`] for the whole run and checks a
//! [`RunControl`] between steps, so a host can pause, resume or cancel it
//! without preempting a step in flight.

use crate::algorithm::engine::{EngineConfig, StepEngine, StepRecord};
use crate::algorithm::residual::Raster;
use crate::io::configuration::{
    DEFAULT_FADE, DEFAULT_MIN_DIST, DEFAULT_SIZE, DEFAULT_STRINGS, MAX_SIZE,
    MIN_PREVIEW_FRACTION, PROGRESS_THROTTLE, YIELD_STRIDE,
};
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::pins::Pin;
use std::time::{Duration, Instant};

/// Parameters controlling a single run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOptions {
    /// Side length of the square raster
    pub size: usize,
    /// Brightness added per pixel of a chosen chord
    pub fade: u32,
    /// Minimum circular index distance between connected pins
    pub min_dist: usize,
    /// Upper bound on the number of steps
    pub max_steps: usize,
    /// Fraction of `max_steps` between progress reports
    pub progress_throttle: f64,
    /// Completed steps between cooperative yields; zero disables yielding
    pub yield_stride: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            fade: DEFAULT_FADE,
            min_dist: DEFAULT_MIN_DIST,
            max_steps: DEFAULT_STRINGS,
            progress_throttle: PROGRESS_THROTTLE,
            yield_stride: YIELD_STRIDE,
        }
    }
}

impl RunOptions {
    /// Check parameters that would make the run meaningless
    ///
    /// # Errors
    ///
    /// Returns [`crate::StringArtError::InvalidParameter`] for a size outside
    /// `1..=MAX_SIZE`, a zero step budget, or a throttle outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size > MAX_SIZE {
            return Err(invalid_parameter(
                "size",
                &self.size,
                &format!("must be in 1..={MAX_SIZE}"),
            ));
        }
        if self.max_steps == 0 {
            return Err(invalid_parameter(
                "max_steps",
                &self.max_steps,
                &"must be positive",
            ));
        }
        if !(self.progress_throttle > 0.0 && self.progress_throttle <= 1.0) {
            return Err(invalid_parameter(
                "progress_throttle",
                &self.progress_throttle,
                &"must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Steps between path snapshots in progress reports
    ///
    /// Coarser than the report throttle: at least twice the throttle and at
    /// least [`MIN_PREVIEW_FRACTION`] of the run.
    pub fn preview_stride(&self) -> usize {
        let fraction = (self.progress_throttle * 2.0).max(MIN_PREVIEW_FRACTION);
        ((self.max_steps as f64 * fraction).round() as usize).max(1)
    }

    const fn engine_config(&self, pin_count: usize) -> EngineConfig {
        EngineConfig {
            size: self.size,
            fade: self.fade,
            min_dist: self.min_dist,
            pin_count,
        }
    }
}

/// Cooperative signals a host exposes to the loop
///
/// Every method has a default, so an unattended run needs no setup.
pub trait RunControl {
    /// Whether the run should stop at the next check
    fn is_canceled(&self) -> bool {
        false
    }

    /// Block while the host holds the run paused
    ///
    /// Must return promptly when not paused, and must return once the run
    /// is canceled.
    fn wait_while_paused(&self) {}

    /// Hand the execution context back to the host scheduler briefly
    fn yield_now(&self) {
        std::thread::yield_now();
    }
}

/// Control for runs nobody pauses or cancels
#[derive(Clone, Copy, Debug, Default)]
pub struct Unattended;

impl RunControl for Unattended {}

/// Throttled progress notification
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    /// Steps completed so far
    pub step: usize,
    /// Step budget of the run
    pub max_steps: usize,
    /// Score of the step just taken
    pub score: f64,
    /// `step / max_steps`
    pub fraction: f64,
    /// Full pin path so far, on preview strides only
    pub path: Option<Vec<usize>>,
    /// Pin layout, attached to the first path snapshot only
    pub pins: Option<Vec<Pin>>,
}

/// Decides which completed steps produce a report and what it carries
///
/// Nothing is recorded until the consumer confirms delivery through
/// [`Self::delivered`], so a dropped report does not use up the first-report
/// slot, the throttle window, the preview stride or the pin layout.
#[derive(Clone, Debug)]
pub struct ProgressGate {
    max_steps: usize,
    throttle: f64,
    preview_stride: usize,
    last_fraction: f64,
    last_preview_step: usize,
    reported: bool,
    pins_sent: bool,
}

impl ProgressGate {
    /// Create a gate for the given run options
    pub fn new(options: &RunOptions) -> Self {
        Self {
            max_steps: options.max_steps,
            throttle: options.progress_throttle,
            preview_stride: options.preview_stride(),
            last_fraction: 0.0,
            last_preview_step: 0,
            reported: false,
            pins_sent: false,
        }
    }

    /// Build a report for the step just completed, if one is due
    ///
    /// Until a report has been delivered every step is due.
    pub fn observe(&self, step: usize, score: f64, engine: &StepEngine) -> Option<ProgressReport> {
        let fraction = step as f64 / self.max_steps.max(1) as f64;
        if self.reported && fraction - self.last_fraction < self.throttle {
            return None;
        }

        let mut report = ProgressReport {
            step,
            max_steps: self.max_steps,
            score,
            fraction,
            path: None,
            pins: None,
        };

        let path = engine.path();
        let preview_due = self.last_preview_step == 0
            || step - self.last_preview_step >= self.preview_stride;
        if !path.is_empty() && preview_due {
            report.path = Some(path.to_vec());
            if !self.pins_sent {
                report.pins = Some(engine.pins().to_vec());
            }
        }
        Some(report)
    }

    /// Record that `report` reached the consumer
    pub fn delivered(&mut self, report: &ProgressReport) {
        self.reported = true;
        self.last_fraction = report.fraction;
        if report.path.is_some() {
            self.last_preview_step = report.step;
        }
        if report.pins.is_some() {
            self.pins_sent = true;
        }
    }
}

/// Everything a run produced
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Accepted steps in order
    pub steps: Vec<StepRecord>,
    /// Residual sum when the loop stopped
    pub final_residual: f64,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Pin layout the run used
    pub pins: Vec<Pin>,
    /// Side length of the raster
    pub size: usize,
    /// The loop stopped because the host canceled it
    pub canceled: bool,
    /// The loop stopped because no legal step remained
    pub exhausted: bool,
}

impl RunOutcome {
    /// Full pin path with the starting pin 0 prepended
    ///
    /// Empty when the board has no pins.
    pub fn path(&self) -> Vec<usize> {
        if self.pins.is_empty() {
            return Vec::new();
        }
        std::iter::once(0)
            .chain(self.steps.iter().map(|step| step.to))
            .collect()
    }
}

/// Run the greedy loop to completion, exhaustion or cancellation
///
/// `on_progress` returns whether it delivered the report; dropped reports
/// are offered again on later steps. Partial results are returned on
/// cancellation with `canceled` set; it is up to the caller to discard them.
///
/// # Errors
///
/// Returns an error if the options are invalid or the raster cannot be read
/// as a `size x size` image. Nothing that happens after construction fails.
pub fn run<C, F>(
    raster: Raster<'_>,
    pin_count: usize,
    options: &RunOptions,
    control: &C,
    mut on_progress: F,
) -> Result<RunOutcome>
where
    C: RunControl + ?Sized,
    F: FnMut(&ProgressReport) -> bool,
{
    options.validate()?;
    let start = Instant::now();
    let mut engine = StepEngine::new(options.engine_config(pin_count), raster)?;
    let mut gate = ProgressGate::new(options);
    let mut canceled = false;
    let mut exhausted = false;

    log::info!(
        "starting run: {pin_count} pins, {} steps max, {}px raster",
        options.max_steps,
        options.size
    );

    for k in 0..options.max_steps {
        if control.is_canceled() {
            canceled = true;
            break;
        }
        control.wait_while_paused();
        // A cancel issued while paused lands here
        if control.is_canceled() {
            canceled = true;
            break;
        }

        let Some(record) = engine.step() else {
            exhausted = true;
            break;
        };

        let completed = k + 1;
        if let Some(report) = gate.observe(completed, record.score, &engine)
            && on_progress(&report)
        {
            gate.delivered(&report);
        }

        if options.yield_stride > 0 && completed % options.yield_stride == 0 {
            control.yield_now();
            if control.is_canceled() {
                canceled = true;
                break;
            }
        }
    }

    let (steps, pins, final_residual) = engine.into_parts();
    let elapsed = start.elapsed();
    if canceled {
        log::debug!("run canceled after {} steps", steps.len());
    } else {
        log::info!(
            "run finished: {} steps in {} ms, residual {final_residual}",
            steps.len(),
            elapsed.as_millis()
        );
    }

    Ok(RunOutcome {
        steps,
        final_residual,
        elapsed,
        pins,
        size: options.size,
        canceled,
        exhausted,
    })
}
