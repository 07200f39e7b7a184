//! Integration tests for the session lifecycle.
//!
//! Drives a session end to end with a manual clock and timer service:
//! start, natural completion into overtime, breaks, interruptions, and the
//! status string at each step.

use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use pomoline_core::session::{FixedPrompt, SharedSink};
use pomoline_core::{
    Counters, CoreError, EventKind, Hooks, ManualClock, ManualTimerService, Operation, Session,
    SessionConfig, SessionState, TaskChoice,
};

struct Harness {
    clock: ManualClock,
    timers: ManualTimerService,
    events: Arc<Mutex<Vec<EventKind>>>,
    session: Session,
}

impl Harness {
    fn new(config: SessionConfig) -> Self {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let timers = ManualTimerService::new(clock.clone());
        let hooks = Arc::new(Hooks::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = Arc::clone(&events);
            hooks.subscribe(kind, move |e| log.lock().unwrap().push(e.kind()));
        }

        let session = Session::new(
            config,
            Arc::new(clock.clone()),
            Box::new(timers.clone()),
            hooks,
        )
        .with_prompt(FixedPrompt("from prompt".into()))
        .with_sink(SharedSink::new());

        Self {
            clock,
            timers,
            events,
            session,
        }
    }

    fn standard() -> Self {
        Self::new(SessionConfig::default())
    }

    /// Let `by` pass and apply any timers that fired.
    fn elapse(&mut self, by: Duration) {
        self.timers.advance(by);
        self.session.process_expirations();
    }

    fn events(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().clone()
    }

    fn count(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|k| **k == kind).count()
    }

    fn into_overtime(&mut self) {
        self.session
            .start(TaskChoice::Given("write spec".into()))
            .unwrap();
        self.elapse(Duration::minutes(25));
        assert_eq!(self.session.state(), SessionState::Overtime);
    }
}

#[test]
fn start_from_idle_counts_down_work_minutes() {
    let mut h = Harness::standard();
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.session.refresh(), "");

    h.session
        .start(TaskChoice::Given("write spec".into()))
        .unwrap();

    assert_eq!(h.session.state(), SessionState::Working);
    assert_eq!(h.session.task(), Some("write spec"));
    assert!(h.session.active_timer().is_some());
    assert_eq!(h.session.remaining(), Duration::seconds(25 * 60));
    assert_eq!(h.session.display(), "<W 25> ");
    assert_eq!(h.events(), vec![EventKind::SessionStarted]);
}

#[test]
fn interrupting_work_cancels_the_timer() {
    let mut h = Harness::standard();
    h.session.start(TaskChoice::Given("a".into())).unwrap();
    let stale = h.session.active_timer().unwrap();

    h.session.interrupt().unwrap();

    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.session.counters().interrupted, 1);
    assert_eq!(h.session.counters().completed, 0);
    assert_eq!(h.count(EventKind::SessionInterrupted), 1);
    assert!(h.session.active_timer().is_none());
    assert_eq!(h.timers.pending(), 0);

    // Neither the clock passing nor a late expiry for the old handle does
    // anything.
    h.elapse(Duration::minutes(30));
    assert!(!h.session.on_timer_fired(stale));
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.count(EventKind::SessionCompleted), 0);
    assert_eq!(h.session.counters().interrupted, 1);
}

#[test]
fn natural_fire_enters_overtime() {
    let mut h = Harness::standard();
    h.session.start(TaskChoice::Given("a".into())).unwrap();
    let started = h.clock.clone();

    h.elapse(Duration::minutes(24));
    assert_eq!(h.session.state(), SessionState::Working);

    h.elapse(Duration::minutes(1));
    assert_eq!(h.session.state(), SessionState::Overtime);
    assert_eq!(
        h.session.last_completion(),
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 25, 0).unwrap())
    );
    assert_eq!(h.session.counters().completed, 1);
    assert_eq!(h.count(EventKind::SessionCompleted), 1);
    assert!(h.session.active_timer().is_none());

    // Zero elapsed at the instant of firing, then the seconds since.
    assert_eq!(h.session.display(), "<O +0:0> ");
    started.advance(Duration::seconds(42));
    assert_eq!(h.session.refresh(), "<O +0:42> ");
    h.clock.advance(Duration::seconds(100));
    assert_eq!(h.session.refresh(), "<O +2:22> ");
}

#[test]
fn overtime_ignores_show_seconds_setting() {
    let mut h = Harness::new(SessionConfig {
        show_seconds: false,
        ..SessionConfig::default()
    });
    h.into_overtime();
    h.clock.advance(Duration::seconds(7));
    assert_eq!(h.session.refresh(), "<O +0:7> ");
}

#[test]
fn break_from_overtime_uses_break_minutes() {
    let mut h = Harness::standard();
    h.into_overtime();

    h.session.start_break(false).unwrap();
    assert_eq!(h.session.state(), SessionState::Break);
    assert_eq!(h.session.remaining(), Duration::seconds(5 * 60));
    assert_eq!(h.session.display(), "<B 5> ");
    assert_eq!(h.count(EventKind::BreakStarted), 1);

    h.elapse(Duration::minutes(5));
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.count(EventKind::BreakEnded), 1);
}

#[test]
fn long_break_uses_long_break_minutes() {
    let mut h = Harness::standard();
    h.into_overtime();
    h.session.start_break(true).unwrap();
    assert_eq!(h.session.remaining(), Duration::minutes(30));
}

#[test]
fn break_while_working_is_rejected_without_side_effects() {
    let mut h = Harness::standard();
    h.session.start(TaskChoice::Given("a".into())).unwrap();
    let timer = h.session.active_timer();
    let events_before = h.events();

    let err = h.session.start_break(false).unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition {
            operation: "start_break",
            state: SessionState::Working
        }
    ));
    assert_eq!(err.to_string(), "Not complete");

    assert_eq!(h.session.state(), SessionState::Working);
    assert_eq!(h.session.active_timer(), timer);
    assert_eq!(h.session.counters(), Counters::default());
    assert_eq!(h.events(), events_before);
}

#[test]
fn break_while_on_break_is_rejected() {
    let mut h = Harness::standard();
    h.session.start_break(false).unwrap();
    assert!(h.session.start_break(true).is_err());
    assert_eq!(h.session.remaining(), Duration::minutes(5));
}

#[test]
fn interrupt_from_idle_is_rejected_every_time() {
    let mut h = Harness::standard();
    for _ in 0..2 {
        let err = h.session.interrupt().unwrap_err();
        assert!(err.is_rejected_command());
    }
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.session.counters(), Counters::default());
    assert!(h.events().is_empty());
}

#[test]
fn interrupt_from_overtime_is_rejected() {
    let mut h = Harness::standard();
    h.into_overtime();
    assert!(h.session.interrupt().is_err());
    assert_eq!(h.session.state(), SessionState::Overtime);
}

#[test]
fn no_direct_path_from_overtime_back_to_work() {
    let mut h = Harness::standard();
    h.into_overtime();
    assert!(h.session.start(TaskChoice::Given("next".into())).is_err());

    h.session.start_break(false).unwrap();
    h.session.start(TaskChoice::Given("next".into())).unwrap();
    assert_eq!(h.session.state(), SessionState::Working);
    assert_eq!(h.session.task(), Some("next"));
}

#[test]
fn auto_dispatch_resolves_one_operation_per_state() {
    let mut h = Harness::standard();

    assert_eq!(h.session.auto_dispatch(false).unwrap(), Operation::Start);
    assert_eq!(h.session.state(), SessionState::Working);
    assert_eq!(h.session.task(), Some("from prompt"));
    assert_eq!(h.events().len(), 1);

    assert_eq!(h.session.auto_dispatch(false).unwrap(), Operation::Interrupt);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.events().len(), 2);

    h.session.auto_dispatch(false).unwrap();
    h.elapse(Duration::minutes(25));
    let before = h.events().len();
    assert_eq!(h.session.auto_dispatch(false).unwrap(), Operation::StartBreak);
    assert_eq!(h.session.state(), SessionState::Break);
    assert_eq!(h.events().len(), before + 1);

    assert_eq!(h.session.auto_dispatch(false).unwrap(), Operation::Interrupt);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.events().last(), Some(&EventKind::BreakEnded));
}

#[test]
fn universal_argument_keeps_task_and_takes_long_break() {
    let mut h = Harness::standard();
    h.session.start(TaskChoice::Given("essay".into())).unwrap();
    h.elapse(Duration::minutes(25));

    h.session.auto_dispatch(true).unwrap();
    assert_eq!(h.session.remaining(), Duration::minutes(30));
    h.session.interrupt().unwrap();

    h.session.auto_dispatch(true).unwrap();
    assert_eq!(h.session.task(), Some("essay"));
}

#[test]
fn counters_never_decrease_over_a_day() {
    let mut h = Harness::new(SessionConfig::from_minutes(1, 1, 2));
    let mut last = Counters::default();

    for round in 0..6 {
        h.session
            .start(TaskChoice::Given(format!("task {round}")))
            .unwrap();
        if round % 3 == 0 {
            h.session.interrupt().unwrap();
        } else {
            h.elapse(Duration::minutes(1));
            h.session.start_break(round % 2 == 0).unwrap();
            h.elapse(Duration::minutes(2));
        }
        let now = h.session.counters();
        assert!(now.completed >= last.completed);
        assert!(now.interrupted >= last.interrupted);
        last = now;
    }

    assert_eq!(
        last,
        Counters {
            completed: 4,
            interrupted: 2
        }
    );
}
