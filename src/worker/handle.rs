//! Dedicated worker thread hosting the execution loop
//!
//! Run requests travel to the thread over a channel; pause, resume and
//! cancel act on the shared [`ControlState`] directly so they take effect
//! while the thread is busy inside a run. All events, status included, are
//! sent through [`ControlState`] under its lock.

use crate::algorithm::executor::{ProgressReport, run};
use crate::algorithm::residual::Raster;
use crate::io::error::{Result, StringArtError};
use crate::worker::control::{ControlState, WaiterRelease};
use crate::worker::protocol::{Event, ProgressEvent, Request, ResultEvent, RunRequest};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// How often a blocked `recv` checks whether the thread died
const LIVENESS_POLL: Duration = Duration::from_millis(100);

struct Job {
    generation: u64,
    request: RunRequest,
}

/// Controller side of a worker thread
///
/// Dropping the handle cancels the active run and joins the thread.
pub struct Worker {
    jobs: Option<Sender<Job>>,
    events: Receiver<Event>,
    control: Arc<ControlState>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Start the worker thread
    ///
    /// # Errors
    ///
    /// Returns [`StringArtError::FileSystem`] if the OS refuses to spawn the
    /// thread.
    pub fn spawn() -> Result<Self> {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let (events_tx, events) = mpsc::channel();
        let control = Arc::new(ControlState::new(events_tx));

        let thread_control = Arc::clone(&control);
        let thread = thread::Builder::new()
            .name("stringloom-worker".to_string())
            .spawn(move || {
                for job in jobs_rx {
                    execute(job, &thread_control);
                }
            })
            .map_err(crate::io::error::file_system("<thread>", "spawn worker"))?;

        Ok(Self {
            jobs: Some(jobs_tx),
            events,
            control,
            thread: Some(thread),
        })
    }

    /// Deliver a request
    ///
    /// Control requests delivered out of order are no-ops and emit nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StringArtError::WorkerDisconnected`] if the thread is gone.
    pub fn send(&self, request: Request) -> Result<()> {
        match request {
            Request::Run(run_request) => {
                let generation = self.control.begin_run();
                self.jobs
                    .as_ref()
                    .ok_or(StringArtError::WorkerDisconnected)?
                    .send(Job {
                        generation,
                        request: run_request,
                    })
                    .map_err(|_closed| StringArtError::WorkerDisconnected)?;
            }
            Request::Pause => {
                self.control.pause();
            }
            Request::Resume => {
                self.control.resume();
            }
            Request::Cancel => {
                self.control.cancel();
            }
        }
        Ok(())
    }

    /// Block until the next event
    ///
    /// # Errors
    ///
    /// Returns [`StringArtError::WorkerDisconnected`] once the thread has
    /// exited and every event it sent has been drained.
    pub fn recv(&self) -> Result<Event> {
        loop {
            if let Some(event) = self.recv_timeout(LIVENESS_POLL)? {
                return Ok(event);
            }
        }
    }

    /// Wait up to `timeout` for the next event
    ///
    /// # Errors
    ///
    /// Returns [`StringArtError::WorkerDisconnected`] once the thread has
    /// exited and every event it sent has been drained.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Event>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) if self.is_alive() => Ok(None),
            Err(_) => self
                .events
                .try_recv()
                .map(Some)
                .map_err(|_empty| StringArtError::WorkerDisconnected),
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&self) -> Option<Event> {
        self.events.try_recv().ok()
    }

    /// Whether the worker thread is still running
    pub fn is_alive(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Shared control state, for inspection
    pub fn control(&self) -> &ControlState {
        &self.control
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.control.cancel();
        self.jobs = None;
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::warn!("worker thread panicked");
        }
    }
}

fn execute(job: Job, control: &ControlState) {
    let ticket = control.ticket(job.generation);
    let _release = WaiterRelease::new(control);
    let request = job.request;
    let options = request.options();

    let on_progress = |report: &ProgressReport| {
        control.emit_progress(
            job.generation,
            Event::Progress(ProgressEvent::from_report(report, options.size)),
        )
    };

    match run(
        Raster::Gray(&request.raster),
        request.pins,
        &options,
        &ticket,
        on_progress,
    ) {
        Ok(outcome) => {
            if !outcome.canceled {
                control.emit_final(job.generation, Event::Result(ResultEvent::from(&outcome)));
            }
        }
        Err(err) => {
            log::warn!("run rejected: {err}");
            control.emit_final(
                job.generation,
                Event::Error {
                    message: err.to_string(),
                },
            );
        }
    }
}
