//! Shell-command hooks from the `[hooks]` config table.

use std::process::{Command, Stdio};

use pomoline_core::{Config, Event, Hooks};
use tracing::{debug, warn};

/// Subscribe one shell command per `[hooks]` entry. Returns how many were
/// registered.
pub fn register(hooks: &Hooks, config: &Config) -> Result<usize, pomoline_core::ConfigError> {
    let commands = config.hook_commands()?;
    let count = commands.len();
    for (kind, command) in commands {
        hooks.subscribe(kind, move |event| spawn(&command, event));
    }
    Ok(count)
}

/// Run `command` under `sh -c` without waiting for it.
fn spawn(command: &str, event: &Event) {
    let kind = event.kind();
    let child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .env("POMOLINE_EVENT", kind.name())
        .env("POMOLINE_TASK", event.task().unwrap_or_default())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .spawn();

    match child {
        Ok(mut child) => {
            debug!(event = %kind, command, pid = child.id(), "hook started");
            // Reap in the background so finished hooks don't linger.
            std::thread::spawn(move || {
                if let Err(e) = child.wait() {
                    warn!(error = %e, "failed to wait for hook");
                }
            });
        }
        Err(e) => warn!(event = %kind, command, error = %e, "failed to start hook"),
    }
}
