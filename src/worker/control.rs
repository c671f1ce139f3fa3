//! Shared pause/cancel state between a controller and the worker thread
//!
//! A single mutex guards the flags and a condition variable wakes paused
//! runs. Every run carries the generation it was started under; starting a
//! newer run bumps the generation, which cancels the older one without
//! touching its flags.
//!
//! Events leave through the state as well, sent while the flags are locked,
//! so a status change and a run's own events are always seen in the order
//! the flags changed.

use crate::algorithm::executor::RunControl;
use crate::worker::protocol::{Event, WorkerState};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::mpsc::Sender;

#[derive(Debug, Default)]
struct Flags {
    paused: bool,
    canceled: bool,
    generation: u64,
}

/// Pause and cancel flags shared by the controller and the worker
#[derive(Debug)]
pub struct ControlState {
    flags: Mutex<Flags>,
    wake: Condvar,
    events: Sender<Event>,
}

impl ControlState {
    /// Create state with no run started, emitting into `events`
    pub fn new(events: Sender<Event>) -> Self {
        Self {
            flags: Mutex::new(Flags::default()),
            wake: Condvar::new(),
            events,
        }
    }

    // Callers hold the flags lock
    fn send(&self, _flags: &MutexGuard<'_, Flags>, event: Event) {
        if self.events.send(event).is_err() {
            log::warn!("worker event channel closed");
        }
    }

    fn send_status(&self, flags: &MutexGuard<'_, Flags>, state: WorkerState) {
        self.send(flags, Event::Status { state });
    }

    /// Reset the flags for a new run, emit `running`, and return its generation
    ///
    /// Waiters of any earlier run are released; that run sees itself
    /// canceled at its next check and can emit nothing further.
    pub fn begin_run(&self) -> u64 {
        let generation = {
            let mut flags = self.flags.lock();
            flags.paused = false;
            flags.canceled = false;
            flags.generation += 1;
            self.send_status(&flags, WorkerState::Running);
            flags.generation
        };
        self.wake.notify_all();
        generation
    }

    /// Set the paused flag and emit `paused`; returns `false` if already paused
    pub fn pause(&self) -> bool {
        let mut flags = self.flags.lock();
        if flags.paused {
            return false;
        }
        flags.paused = true;
        self.send_status(&flags, WorkerState::Paused);
        true
    }

    /// Clear the paused flag, emit `running` and wake waiters
    ///
    /// Returns `false` if not paused.
    pub fn resume(&self) -> bool {
        {
            let mut flags = self.flags.lock();
            if !flags.paused {
                return false;
            }
            flags.paused = false;
            self.send_status(&flags, WorkerState::Running);
        }
        self.wake.notify_all();
        true
    }

    /// Cancel the current run, overriding any pause, and emit `canceled`
    ///
    /// Returns `false` if already canceled.
    pub fn cancel(&self) -> bool {
        {
            let mut flags = self.flags.lock();
            if flags.canceled {
                return false;
            }
            flags.canceled = true;
            flags.paused = false;
            self.send_status(&flags, WorkerState::Canceled);
        }
        self.wake.notify_all();
        true
    }

    /// Send a progress event if the run is current, not canceled and not paused
    ///
    /// Returns whether the event was sent.
    pub fn emit_progress(&self, generation: u64, event: Event) -> bool {
        let flags = self.flags.lock();
        if flags.paused || flags.canceled || flags.generation != generation {
            return false;
        }
        self.send(&flags, event);
        true
    }

    /// Send a run's closing event if the run is current and not canceled
    ///
    /// Returns whether the event was sent.
    pub fn emit_final(&self, generation: u64, event: Event) -> bool {
        let flags = self.flags.lock();
        if flags.canceled || flags.generation != generation {
            return false;
        }
        self.send(&flags, event);
        true
    }

    /// Whether the paused flag is set
    pub fn is_paused(&self) -> bool {
        self.flags.lock().paused
    }

    /// Generation of the most recently started run
    pub fn generation(&self) -> u64 {
        self.flags.lock().generation
    }

    /// Wake every thread blocked in a pause wait
    pub fn release_waiters(&self) {
        self.wake.notify_all();
    }

    /// Control handle for the run started under `generation`
    pub const fn ticket(&self, generation: u64) -> RunTicket<'_> {
        RunTicket {
            state: self,
            generation,
        }
    }
}

/// [`RunControl`] view of the shared state for one run generation
#[derive(Clone, Copy, Debug)]
pub struct RunTicket<'a> {
    state: &'a ControlState,
    generation: u64,
}

impl RunTicket<'_> {
    /// Generation this ticket belongs to
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl RunControl for RunTicket<'_> {
    fn is_canceled(&self) -> bool {
        let flags = self.state.flags.lock();
        flags.canceled || flags.generation != self.generation
    }

    fn wait_while_paused(&self) {
        let mut flags = self.state.flags.lock();
        while flags.paused && !flags.canceled && flags.generation == self.generation {
            self.state.wake.wait(&mut flags);
        }
    }
}

/// Releases pause waiters when dropped
///
/// Held for the duration of a run so every exit path, unwinding included,
/// leaves no thread blocked on the condition variable.
#[derive(Debug)]
pub struct WaiterRelease<'a>(&'a ControlState);

impl<'a> WaiterRelease<'a> {
    /// Guard the given state
    pub const fn new(state: &'a ControlState) -> Self {
        Self(state)
    }
}

impl Drop for WaiterRelease<'_> {
    fn drop(&mut self) {
        self.0.release_waiters();
    }
}
