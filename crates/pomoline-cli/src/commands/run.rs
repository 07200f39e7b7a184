//! Interactive host.
//!
//! The session runs in its own task on a multi-threaded runtime; this
//! thread reads one command per stdin line and waits for the session's
//! reply before reading the next, so a task prompt raised by `start` reads
//! the following line.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use pomoline_core::{
    Config, ConfigError, CoreError, Hooks, Session, SessionConfig, SessionHandle,
    SessionSnapshot, SystemClock, TaskChoice, TokioTimerService,
};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::hooks;
use crate::terminal::{StdinPrompt, TerminalSink};

const HELP: &str = "\
commands:
  start [task]   start a work session (asks for a task if none given)
  start!         start, keeping the current task
  interrupt      abandon work, or end the break early
  break          start a short break
  break!         start a long break
  dwim / dwim!   do the obvious next thing
  status         print the session as JSON
  quit";

#[derive(Args)]
pub struct RunArgs {
    /// Show seconds in work and break countdowns
    #[arg(long)]
    show_seconds: bool,

    /// Never ask for a task description
    #[arg(long)]
    no_prompt: bool,

    /// Work session length in minutes
    #[arg(long, value_name = "MINUTES")]
    work: Option<u32>,

    /// Short break length in minutes
    #[arg(long = "break", value_name = "MINUTES")]
    short_break: Option<u32>,

    /// Long break length in minutes
    #[arg(long, value_name = "MINUTES")]
    long_break: Option<u32>,
}

impl RunArgs {
    /// Command-line flags win over the config file for this run only.
    fn apply(&self, config: &mut Config) -> Result<(), ConfigError> {
        if self.show_seconds {
            config.display.show_seconds = true;
        }
        if self.no_prompt {
            config.task.prompt_for_task = false;
        }
        if let Some(m) = self.work {
            config.timer.work_minutes = m;
        }
        if let Some(m) = self.short_break {
            config.timer.break_minutes = m;
        }
        if let Some(m) = self.long_break {
            config.timer.long_break_minutes = m;
        }
        config.validate()
    }

    /// Re-read the config file so edits made while the host runs apply to
    /// the next countdown.
    fn reload(&self) -> Result<SessionConfig, ConfigError> {
        let mut config = Config::load()?;
        self.apply(&mut config)?;
        Ok(config.session_config())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostCommand {
    Start(TaskChoice),
    Interrupt,
    Break { long: bool },
    Dwim { universal: bool },
    Status,
    Help,
    Quit,
}

impl HostCommand {
    /// Commands that may arm a new countdown.
    fn arms_timer(&self) -> bool {
        matches!(
            self,
            HostCommand::Start(_) | HostCommand::Break { .. } | HostCommand::Dwim { .. }
        )
    }
}

impl FromStr for HostCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "start" if rest.is_empty() => HostCommand::Start(TaskChoice::Ask),
            "start" => HostCommand::Start(TaskChoice::Given(rest.to_string())),
            "start!" => HostCommand::Start(TaskChoice::KeepCurrent),
            "interrupt" | "stop" => HostCommand::Interrupt,
            "break" => HostCommand::Break { long: false },
            "break!" => HostCommand::Break { long: true },
            "dwim" => HostCommand::Dwim { universal: false },
            "dwim!" => HostCommand::Dwim { universal: true },
            "status" => HostCommand::Status,
            "help" | "?" => HostCommand::Help,
            "quit" | "exit" | "q" => HostCommand::Quit,
            other => return Err(format!("unknown command: {other} (try 'help')")),
        };
        Ok(command)
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    args.apply(&mut config)?;

    let runtime = Runtime::new()?;
    let handle = runtime.block_on(async {
        let registry = Arc::new(Hooks::new());
        let registered = hooks::register(&registry, &config)?;
        info!(hooks = registered, "hooks registered");

        let clock = Arc::new(SystemClock);
        let timers = TokioTimerService::new(clock.clone(), tokio::runtime::Handle::current());
        let session = Session::new(config.session_config(), clock, Box::new(timers), registry)
            .with_prompt(StdinPrompt)
            .with_sink(TerminalSink::new());
        let (handle, _task) = SessionHandle::spawn(session);
        Ok::<_, ConfigError>(handle)
    })?;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        // Lock per read: the task prompt reads stdin too.
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<HostCommand>() {
            Ok(command) => command,
            Err(message) => {
                eprintln!("error: {message}");
                continue;
            }
        };

        if command.arms_timer() {
            match args.reload() {
                Ok(config) => {
                    runtime.block_on(handle.set_config(config))?;
                    debug!("config reloaded");
                }
                Err(e) => warn!(error = %e, "config reload failed, keeping previous settings"),
            }
        }

        match runtime.block_on(execute(&handle, command)) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_rejected_command() => eprintln!("error: {e}"),
            Err(e @ CoreError::Prompt(_)) => eprintln!("error: {e}"),
            Err(e) => {
                error!(error = %e, "session failed");
                return Err(e.into());
            }
        }
    }

    runtime.block_on(handle.shutdown())?;
    Ok(())
}

/// Returns false when the host should exit.
async fn execute(handle: &SessionHandle, command: HostCommand) -> pomoline_core::Result<bool> {
    match command {
        HostCommand::Start(choice) => handle.start(choice).await?,
        HostCommand::Interrupt => handle.interrupt().await?,
        HostCommand::Break { long } => handle.start_break(long).await?,
        HostCommand::Dwim { universal } => {
            let operation = handle.auto_dispatch(universal).await?;
            info!(?operation, "dwim");
        }
        HostCommand::Status => {
            let snapshot = handle.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            return Ok(true);
        }
        HostCommand::Help => {
            println!("{HELP}");
            return Ok(true);
        }
        HostCommand::Quit => return Ok(false),
    }

    println!("{}", summary(&handle.snapshot().await?));
    Ok(true)
}

/// One-line result, e.g. `working <W 25>`.
fn summary(snapshot: &SessionSnapshot) -> String {
    let display = snapshot.display.trim_end();
    if display.is_empty() {
        snapshot.state.to_string()
    } else {
        format!("{} {display}", snapshot.state)
    }
}
