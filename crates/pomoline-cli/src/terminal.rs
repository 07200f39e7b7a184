//! Terminal collaborators for the interactive session: the status line
//! painter and the stdin task prompt.

use std::io::{self, BufRead, IsTerminal, Write};

use pomoline_core::{CoreError, StatusSink, TaskPrompt};

/// Paints the status string on stderr.
///
/// On a terminal the line is redrawn in place every refresh. Otherwise
/// only changes are written, one per line.
pub struct TerminalSink {
    interactive: bool,
    last: Option<String>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            interactive: io::stderr().is_terminal(),
            last: None,
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for TerminalSink {
    fn publish(&mut self, display: &str) {
        let mut err = io::stderr().lock();
        if self.interactive {
            let _ = write!(err, "\r\x1b[K{display}");
        } else if self.last.as_deref() != Some(display) {
            let _ = writeln!(err, "status: {display}");
        }
        let _ = err.flush();
        self.last = Some(display.to_string());
    }
}

/// Reads the task description from stdin.
pub struct StdinPrompt;

impl TaskPrompt for StdinPrompt {
    fn ask(&mut self) -> pomoline_core::Result<String> {
        // Runs on a runtime worker; let the runtime move other tasks off it.
        tokio::task::block_in_place(|| -> pomoline_core::Result<String> {
            eprint!("Task: ");
            io::stderr().flush()?;
            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line)?;
            if read == 0 {
                return Err(CoreError::Prompt("stdin closed".into()));
            }
            Ok(line.trim_end().to_string())
        })
    }
}
