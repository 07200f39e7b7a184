//! Single-owner session task.
//!
//! The session is moved into one Tokio task. Commands, timer expiries and
//! the once-per-second repaint tick are all handled in that task's loop, so
//! at most one transition is ever in flight.

use std::time::Duration as StdDuration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::config::SessionConfig;
use super::machine::{Operation, Session, TaskChoice};
use super::state::SessionSnapshot;
use crate::error::{CoreError, Result};

const COMMAND_BUFFER: usize = 32;
const TICK: StdDuration = StdDuration::from_secs(1);

enum Command {
    Start {
        choice: TaskChoice,
        reply: oneshot::Sender<Result<()>>,
    },
    Interrupt {
        reply: oneshot::Sender<Result<()>>,
    },
    StartBreak {
        long: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    AutoDispatch {
        universal: bool,
        reply: oneshot::Sender<Result<Operation>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    SetConfig {
        config: SessionConfig,
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Cloneable handle to a session running in its own task.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Move `session` into a new task on the current runtime, repainting
    /// once per second.
    pub fn spawn(session: Session) -> (Self, JoinHandle<()>) {
        Self::spawn_with_tick(session, TICK)
    }

    pub fn spawn_with_tick(session: Session, tick: StdDuration) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(session, rx, tick));
        (Self { tx }, task)
    }

    pub async fn start(&self, choice: TaskChoice) -> Result<()> {
        self.request(|reply| Command::Start { choice, reply }).await?
    }

    pub async fn interrupt(&self) -> Result<()> {
        self.request(|reply| Command::Interrupt { reply }).await?
    }

    pub async fn start_break(&self, long: bool) -> Result<()> {
        self.request(|reply| Command::StartBreak { long, reply })
            .await?
    }

    pub async fn auto_dispatch(&self, universal: bool) -> Result<Operation> {
        self.request(|reply| Command::AutoDispatch { universal, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub async fn set_config(&self, config: SessionConfig) -> Result<()> {
        self.request(|reply| Command::SetConfig { config, reply })
            .await
    }

    /// Stop the session task. Pending countdowns are dropped with it.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| CoreError::SessionClosed)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| CoreError::SessionClosed)?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }
}

async fn run(mut session: Session, mut commands: mpsc::Receiver<Command>, tick: StdDuration) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("session task started");

    loop {
        tokio::select! {
            Some(handle) = session.next_expiry() => {
                session.on_timer_fired(handle);
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                if !apply(&mut session, command) {
                    break;
                }
            }
            _ = ticker.tick() => {
                session.refresh();
            }
        }
    }

    info!("session task stopped");
}

/// Returns false when the loop should stop.
fn apply(session: &mut Session, command: Command) -> bool {
    // A dropped reply receiver just means the caller stopped waiting.
    match command {
        Command::Start { choice, reply } => {
            let _ = reply.send(session.start(choice));
        }
        Command::Interrupt { reply } => {
            let _ = reply.send(session.interrupt());
        }
        Command::StartBreak { long, reply } => {
            let _ = reply.send(session.start_break(long));
        }
        Command::AutoDispatch { universal, reply } => {
            let _ = reply.send(session.auto_dispatch(universal));
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(session.snapshot());
        }
        Command::SetConfig { config, reply } => {
            session.set_config(config);
            let _ = reply.send(());
        }
        Command::Shutdown => {
            debug!("shutdown requested");
            return false;
        }
    }
    true
}
