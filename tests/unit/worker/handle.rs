//! Tests for the worker thread: event flow, pause, cancel and supersession

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};
    use stringloom::worker::protocol::{Event, Request, ResultEvent, RunRequest, WorkerState};
    use stringloom::worker::Worker;

    const DEADLINE: Duration = Duration::from_secs(60);

    fn request(size: usize, pins: usize, max_steps: usize) -> RunRequest {
        RunRequest {
            size,
            fade: 20,
            min_dist: 1,
            max_steps,
            raster: vec![40; size * size],
            pins,
        }
    }

    // A run long enough that it cannot finish before a follow-up request lands
    fn long_request() -> RunRequest {
        request(300, 150, 100_000)
    }

    fn next_event(worker: &Worker) -> Event {
        worker
            .recv_timeout(DEADLINE)
            .expect("worker should stay connected")
            .expect("event should arrive before the deadline")
    }

    fn wait_for_result(worker: &Worker) -> ResultEvent {
        let start = Instant::now();
        loop {
            assert!(start.elapsed() < DEADLINE, "no result before deadline");
            if let Event::Result(result) = next_event(worker) {
                return result;
            }
        }
    }

    fn events_through_result(worker: &Worker) -> Vec<Event> {
        let mut events = Vec::new();
        let start = Instant::now();
        loop {
            assert!(start.elapsed() < DEADLINE, "no result before deadline");
            let event = next_event(worker);
            let done = matches!(event, Event::Result(_));
            events.push(event);
            if done {
                return events;
            }
        }
    }

    fn drain(worker: &Worker, quiet_for: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = worker
            .recv_timeout(quiet_for)
            .expect("worker should stay connected")
        {
            events.push(event);
        }
        events
    }

    // Tests a run reports running, progress in order and a final result
    // Verified by emitting the result before the last progress event
    #[test]
    fn test_run_to_completion() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(request(120, 12, 20)))
            .expect("run should be accepted");

        assert_eq!(
            next_event(&worker),
            Event::Status {
                state: WorkerState::Running
            }
        );

        let mut last_step = 0;
        let result = loop {
            match next_event(&worker) {
                Event::Progress(progress) => {
                    assert!(progress.step > last_step);
                    assert_eq!(progress.max, 20);
                    last_step = progress.step;
                }
                Event::Result(result) => break result,
                other => unreachable!("unexpected event {other:?}"),
            }
        };

        assert_eq!(result.steps.first(), Some(&0));
        assert!(result.steps.len() <= 21);
        assert_eq!(result.records.len() + 1, result.steps.len());
        assert_eq!(result.size, 120);
        assert_eq!(result.pins.len(), 12);
        assert!(last_step >= 1);
    }

    // Tests canceling a fresh run emits canceled status and no result
    #[test]
    fn test_cancel_suppresses_result() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(long_request()))
            .expect("run should be accepted");
        worker.send(Request::Cancel).expect("cancel should be accepted");

        let events = drain(&worker, Duration::from_millis(500));
        assert!(events.contains(&Event::Status {
            state: WorkerState::Canceled
        }));
        assert!(!events.iter().any(|e| matches!(e, Event::Result(_))));
    }

    // Tests pausing freezes progress until resumed
    // Verified by ignoring the paused flag in the progress callback
    #[test]
    fn test_pause_freezes_progress() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(request(200, 60, 5_000)))
            .expect("run should be accepted");

        let first_step = loop {
            if let Event::Progress(progress) = next_event(&worker) {
                break progress.step;
            }
        };

        worker.send(Request::Pause).expect("pause should be accepted");
        let settling = drain(&worker, Duration::from_millis(200));
        assert!(settling.contains(&Event::Status {
            state: WorkerState::Paused
        }));
        let mut last_step = settling
            .iter()
            .filter_map(|e| match e {
                Event::Progress(p) => Some(p.step),
                _ => None,
            })
            .max()
            .unwrap_or(first_step);

        thread_sleep(300);
        assert!(worker.try_recv().is_none(), "progress while paused");

        worker.send(Request::Resume).expect("resume should be accepted");
        assert_eq!(
            next_event(&worker),
            Event::Status {
                state: WorkerState::Running
            }
        );

        let start = Instant::now();
        loop {
            assert!(start.elapsed() < DEADLINE, "run did not continue");
            match next_event(&worker) {
                Event::Progress(progress) => {
                    assert!(progress.step > last_step);
                    last_step = progress.step;
                }
                Event::Result(result) => {
                    assert!(result.records.len() >= last_step);
                    break;
                }
                other => unreachable!("unexpected event {other:?}"),
            }
        }
    }

    fn thread_sleep(millis: u64) {
        std::thread::sleep(Duration::from_millis(millis));
    }

    // Tests a new run supersedes the active one
    #[test]
    fn test_new_run_supersedes() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(long_request()))
            .expect("first run should be accepted");
        worker
            .send(Request::Run(request(100, 10, 15)))
            .expect("second run should be accepted");

        let result = wait_for_result(&worker);
        assert_eq!(result.size, 100);

        let rest = drain(&worker, Duration::from_millis(300));
        assert!(!rest.iter().any(|e| matches!(e, Event::Result(_))));
    }

    // Tests out-of-order control requests emit nothing
    #[test]
    fn test_out_of_order_requests_are_silent() {
        let worker = Worker::spawn().expect("worker should start");
        worker.send(Request::Resume).expect("resume should be accepted");
        assert!(worker.try_recv().is_none());

        worker.send(Request::Pause).expect("pause should be accepted");
        worker.send(Request::Pause).expect("pause should be accepted");
        worker.send(Request::Cancel).expect("cancel should be accepted");
        worker.send(Request::Cancel).expect("cancel should be accepted");

        let events = drain(&worker, Duration::from_millis(100));
        assert_eq!(
            events,
            vec![
                Event::Status {
                    state: WorkerState::Paused
                },
                Event::Status {
                    state: WorkerState::Canceled
                },
            ]
        );
    }

    // Tests malformed rasters produce an error event instead of a result
    #[test]
    fn test_bad_raster_reports_error() {
        let worker = Worker::spawn().expect("worker should start");
        let mut bad = request(50, 8, 10);
        bad.raster.truncate(10);
        worker.send(Request::Run(bad)).expect("run should be accepted");

        let events = drain(&worker, Duration::from_millis(500));
        assert!(events.iter().any(|e| matches!(e, Event::Error { .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::Result(_))));
        assert!(worker.is_alive());
    }

    // Tests dropping the handle while paused does not hang
    #[test]
    fn test_drop_while_paused() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(long_request()))
            .expect("run should be accepted");
        worker.send(Request::Pause).expect("pause should be accepted");
        assert!(worker.control().is_paused());
        drop(worker);
    }

    // Tests a pause landing before the first report still delivers the pin layout
    // Verified by recording the pin layout as sent when the report is dropped
    #[test]
    fn test_pause_at_start_keeps_pin_layout() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(request(600, 400, 3)))
            .expect("run should be accepted");
        worker.send(Request::Pause).expect("pause should be accepted");
        thread_sleep(100);
        worker.send(Request::Resume).expect("resume should be accepted");

        let mut layouts = Vec::new();
        let start = Instant::now();
        loop {
            assert!(start.elapsed() < DEADLINE, "no result before deadline");
            match next_event(&worker) {
                Event::Progress(progress) => {
                    if let Some(pins) = progress.pins {
                        assert!(progress.steps.is_some());
                        layouts.push(pins.len());
                    }
                }
                Event::Result(result) => {
                    assert_eq!(result.pins.len(), 400);
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(layouts, vec![400]);
    }

    // Tests no progress or result ever trails a canceled status
    // Verified by sending the result outside the control lock
    #[test]
    fn test_nothing_follows_canceled() {
        let worker = Worker::spawn().expect("worker should start");
        for round in 0..20 {
            worker
                .send(Request::Run(request(60, 8, 5 + round % 7)))
                .expect("run should be accepted");
            if round % 3 == 0 {
                thread_sleep(1);
            }
            worker.send(Request::Cancel).expect("cancel should be accepted");

            let events = drain(&worker, Duration::from_millis(150));
            let canceled_at = events
                .iter()
                .position(|e| {
                    *e == Event::Status {
                        state: WorkerState::Canceled,
                    }
                })
                .expect("cancel should be reported");
            assert!(
                !events
                    .iter()
                    .skip(canceled_at)
                    .any(|e| matches!(e, Event::Result(_) | Event::Progress(_))),
                "run event after canceled in round {round}"
            );
        }
    }

    // Tests progress from a superseded run never follows the new running status
    #[test]
    fn test_superseded_progress_is_silent() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(long_request()))
            .expect("first run should be accepted");
        thread_sleep(50);
        worker
            .send(Request::Run(request(100, 10, 15)))
            .expect("second run should be accepted");

        let events = events_through_result(&worker);

        let second_start = events
            .iter()
            .rposition(|e| {
                *e == Event::Status {
                    state: WorkerState::Running,
                }
            })
            .expect("second run should report running");
        for event in events.iter().skip(second_start) {
            if let Event::Progress(progress) = event {
                assert_eq!(progress.max, 15, "superseded progress leaked");
            }
        }
    }

    // Tests a superseded job that fails validation reports nothing
    // Verified by emitting errors without checking the generation
    #[test]
    fn test_superseded_error_is_silent() {
        let worker = Worker::spawn().expect("worker should start");
        worker
            .send(Request::Run(long_request()))
            .expect("first run should be accepted");
        let mut bad = request(50, 8, 10);
        bad.raster.truncate(10);
        worker
            .send(Request::Run(bad))
            .expect("bad run should be accepted");
        worker
            .send(Request::Run(request(80, 8, 5)))
            .expect("last run should be accepted");

        let mut events = events_through_result(&worker);
        events.extend(drain(&worker, Duration::from_millis(300)));

        // An error may only come from the bad job while it was still current
        let last_start = events
            .iter()
            .rposition(|e| {
                *e == Event::Status {
                    state: WorkerState::Running,
                }
            })
            .expect("last run should report running");
        assert!(
            !events
                .iter()
                .skip(last_start)
                .any(|e| matches!(e, Event::Error { .. }))
        );
        assert!(matches!(events.last(), Some(Event::Result(r)) if r.size == 80));
    }

    // Tests an absurd board size is rejected without taking the worker down
    // Verified by squaring the size without an overflow check
    #[test]
    fn test_huge_size_reports_error() {
        let worker = Worker::spawn().expect("worker should start");
        let mut huge = request(4, 8, 10);
        huge.size = 1 << 33;
        worker.send(Request::Run(huge)).expect("run should be accepted");

        let events = drain(&worker, Duration::from_millis(500));
        assert!(events.iter().any(|e| matches!(e, Event::Error { .. })));
        assert!(worker.is_alive());

        worker
            .send(Request::Run(request(60, 8, 4)))
            .expect("follow-up run should be accepted");
        assert_eq!(wait_for_result(&worker).size, 60);
    }
}
