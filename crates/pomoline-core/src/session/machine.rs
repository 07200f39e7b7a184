//! Session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle ──start──▶ Working ──(timer)──▶ Overtime ──start_break──▶ Break
//!  ▲  ◀─interrupt──┘                                              │
//!  │                         Idle ──start_break──▶ Break          │
//!  └──────────────── interrupt / (timer) ─────────────────────────┘
//!                        Break ──start──▶ Working
//! ```
//!
//! Timer callbacks never touch the session. They push the fired handle onto
//! a channel the session owns; the owner applies it with
//! [`Session::process_expirations`] or by awaiting
//! [`Session::next_expiry`] and calling [`Session::on_timer_fired`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::host::{NoPrompt, NullSink, StatusSink, TaskPrompt};
use super::state::{Counters, SessionSnapshot, SessionState};
use super::status::StatusStringBuilder;
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::format::round_seconds;
use crate::notify::NotificationDispatcher;
use crate::timer::{CountdownTimer, TimerHandle, TimerService};

/// Where the description for a new work session comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChoice {
    /// Ask the prompt when `prompt_for_task` is on; otherwise keep the
    /// current description.
    Ask,
    /// Keep the current description; only ask if there is none and
    /// `prompt_for_task` is on.
    KeepCurrent,
    /// Use this description without asking.
    Given(String),
}

/// Which operation [`Session::auto_dispatch`] resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Interrupt,
    StartBreak,
}

pub struct Session {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    countdown: CountdownTimer,
    dispatcher: Arc<dyn NotificationDispatcher>,
    prompt: Box<dyn TaskPrompt>,
    sink: Box<dyn StatusSink>,

    state: SessionState,
    task: Option<String>,
    last_completion: Option<DateTime<Utc>>,
    counters: Counters,
    display: String,

    expired_tx: mpsc::UnboundedSender<TimerHandle>,
    expired_rx: mpsc::UnboundedReceiver<TimerHandle>,
}

impl Session {
    /// Create an idle session. The prompt defaults to [`NoPrompt`] and the
    /// status sink to [`NullSink`].
    pub fn new(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        timers: Box<dyn TimerService>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        Self {
            config,
            clock,
            countdown: CountdownTimer::new(timers),
            dispatcher,
            prompt: Box::new(NoPrompt),
            sink: Box::new(NullSink),
            state: SessionState::Idle,
            task: None,
            last_completion: None,
            counters: Counters::default(),
            display: String::new(),
            expired_tx,
            expired_rx,
        }
    }

    pub fn with_prompt(mut self, prompt: impl TaskPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn with_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn task(&self) -> Option<&str> {
        self.task.as_deref()
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn last_completion(&self) -> Option<DateTime<Utc>> {
        self.last_completion
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.countdown.handle()
    }

    /// Time left on the countdown; zero outside Working and Break.
    pub fn remaining(&self) -> Duration {
        self.countdown.remaining()
    }

    /// Time since the work timer ran out; `None` outside Overtime.
    pub fn overtime(&self) -> Option<Duration> {
        match (self.state, self.last_completion) {
            (SessionState::Overtime, Some(at)) => {
                Some(self.clock.difference(self.clock.now(), at).max(Duration::zero()))
            }
            (SessionState::Overtime, None) => Some(Duration::zero()),
            _ => None,
        }
    }

    /// The cached status string from the last refresh.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            task: self.task.clone(),
            remaining_secs: self
                .state
                .has_countdown()
                .then(|| round_seconds(self.remaining())),
            overtime_secs: self
                .overtime()
                .map(|d| u64::try_from(d.num_seconds()).unwrap_or(0)),
            last_completion: self.last_completion,
            counters: self.counters,
            display: self.display.clone(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a work session. Allowed from Idle and Break.
    pub fn start(&mut self, choice: TaskChoice) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Break => {}
            SessionState::Working | SessionState::Overtime => {
                return Err(self.rejected("start"));
            }
        }

        // Resolve the description first so a failed prompt leaves no trace.
        let task = self.resolve_task(choice)?;

        self.countdown.cancel();
        self.task = task;
        self.state = SessionState::Working;
        let duration = self.config.work_duration;
        self.arm(duration);

        info!(task = ?self.task, minutes = duration.num_minutes(), "work session started");
        self.dispatch(Event::SessionStarted {
            task: self.task.clone(),
            duration_secs: whole_seconds(duration),
            at: self.clock.now(),
        });
        self.refresh();
        Ok(())
    }

    /// Abandon the running work session or cut the break short.
    pub fn interrupt(&mut self) -> Result<()> {
        match self.state {
            SessionState::Working => {
                self.countdown.cancel();
                self.counters.interrupted += 1;
                self.state = SessionState::Idle;

                info!(interrupted = self.counters.interrupted, "work session interrupted");
                self.dispatch(Event::SessionInterrupted {
                    task: self.task.clone(),
                    interrupted: self.counters.interrupted,
                    at: self.clock.now(),
                });
            }
            SessionState::Break => {
                self.countdown.cancel();
                self.state = SessionState::Idle;

                info!("break ended early");
                self.dispatch(Event::BreakEnded {
                    early: true,
                    at: self.clock.now(),
                });
            }
            SessionState::Idle | SessionState::Overtime => {
                return Err(self.rejected("interrupt"));
            }
        }
        self.refresh();
        Ok(())
    }

    /// Begin a break. Allowed from Overtime and Idle only: a running work
    /// session must finish first.
    pub fn start_break(&mut self, long: bool) -> Result<()> {
        match self.state {
            SessionState::Overtime | SessionState::Idle => {}
            SessionState::Working | SessionState::Break => {
                return Err(self.rejected("start_break"));
            }
        }

        let duration = self.config.break_duration(long);
        self.state = SessionState::Break;

        info!(long, minutes = duration.num_minutes(), "break started");
        self.dispatch(Event::BreakStarted {
            long,
            duration_secs: whole_seconds(duration),
            at: self.clock.now(),
        });
        self.arm(duration);
        self.refresh();
        Ok(())
    }

    /// Do the obvious next thing for the current state.
    ///
    /// `universal` keeps the current task when starting and picks the long
    /// break when breaking.
    pub fn auto_dispatch(&mut self, universal: bool) -> Result<Operation> {
        match self.state {
            SessionState::Idle => {
                let choice = if universal {
                    TaskChoice::KeepCurrent
                } else {
                    TaskChoice::Ask
                };
                self.start(choice).map(|()| Operation::Start)
            }
            SessionState::Working | SessionState::Break => {
                self.interrupt().map(|()| Operation::Interrupt)
            }
            SessionState::Overtime => self.start_break(universal).map(|()| Operation::StartBreak),
        }
    }

    /// Apply a natural fire. Returns false for stale handles (cancelled
    /// before their expiry was processed), which change nothing.
    pub fn on_timer_fired(&mut self, handle: TimerHandle) -> bool {
        if !self.countdown.release(handle) {
            debug!(timer = handle.id(), "ignoring expiry of inactive timer");
            return false;
        }

        match self.state {
            SessionState::Working => {
                let now = self.clock.now();
                self.counters.completed += 1;
                self.last_completion = Some(now);
                self.state = SessionState::Overtime;

                info!(completed = self.counters.completed, "work session completed");
                self.dispatch(Event::SessionCompleted {
                    task: self.task.clone(),
                    completed: self.counters.completed,
                    at: now,
                });
            }
            SessionState::Break => {
                self.state = SessionState::Idle;

                info!("break finished");
                self.dispatch(Event::BreakEnded {
                    early: false,
                    at: self.clock.now(),
                });
            }
            SessionState::Idle | SessionState::Overtime => {
                error!(
                    timer = handle.id(),
                    state = %self.state,
                    "live timer in a state without a countdown"
                );
                return false;
            }
        }
        self.refresh();
        true
    }

    /// Apply every expiry that has already been delivered. Returns how many
    /// caused a transition.
    pub fn process_expirations(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(handle) = self.expired_rx.try_recv() {
            if self.on_timer_fired(handle) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next timer to fire.
    pub async fn next_expiry(&mut self) -> Option<TimerHandle> {
        self.expired_rx.recv().await
    }

    /// Recompute the status string and publish it. Called after every
    /// transition and by the host's once-per-second tick.
    pub fn refresh(&mut self) -> &str {
        let builder = StatusStringBuilder::new(self.config.show_seconds);
        self.display = builder.build(
            self.state,
            self.countdown.remaining(),
            self.last_completion,
            self.clock.as_ref(),
        );
        self.sink.publish(&self.display);
        &self.display
    }

    /// Replace the configuration. Running countdowns keep their length;
    /// the new durations apply from the next start or break.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
        self.refresh();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn resolve_task(&mut self, choice: TaskChoice) -> Result<Option<String>> {
        let ask = match &choice {
            TaskChoice::Given(_) => false,
            TaskChoice::Ask => self.config.prompt_for_task,
            TaskChoice::KeepCurrent => self.config.prompt_for_task && self.task.is_none(),
        };

        if let TaskChoice::Given(task) = choice {
            return Ok(Some(task));
        }
        if !ask {
            return Ok(self.task.clone());
        }

        let answer = self.prompt.ask()?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    fn arm(&mut self, duration: Duration) {
        let tx = self.expired_tx.clone();
        self.countdown.arm(
            duration,
            Box::new(move |handle| {
                // The receiver lives as long as the session; a send error
                // only means the session is gone.
                let _ = tx.send(handle);
            }),
        );
    }

    fn dispatch(&self, event: Event) {
        debug!(event = %event.kind(), "notify");
        self.dispatcher.notify(&event);
    }

    fn rejected(&self, operation: &'static str) -> CoreError {
        warn!(operation, state = %self.state, "rejected command");
        CoreError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}

fn whole_seconds(duration: Duration) -> u64 {
    u64::try_from(duration.num_seconds()).unwrap_or(0)
}
