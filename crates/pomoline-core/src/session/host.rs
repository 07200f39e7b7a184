//! Collaborators supplied by the host: the task prompt and the place the
//! status string goes.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;

/// Asks the user what they are about to work on.
pub trait TaskPrompt: Send {
    fn ask(&mut self) -> Result<String>;
}

/// Receives the status string after every recomputation.
pub trait StatusSink: Send {
    fn publish(&mut self, display: &str);
}

/// Prompt for hosts that never ask; yields an empty description.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl TaskPrompt for NoPrompt {
    fn ask(&mut self) -> Result<String> {
        Ok(String::new())
    }
}

/// Answers every prompt with the same text.
#[derive(Debug, Clone)]
pub struct FixedPrompt(pub String);

impl TaskPrompt for FixedPrompt {
    fn ask(&mut self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn publish(&mut self, _display: &str) {}
}

/// Sink that keeps every published string; clones share the log.
#[derive(Debug, Default, Clone)]
pub struct SharedSink {
    published: Arc<Mutex<Vec<String>>>,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl StatusSink for SharedSink {
    fn publish(&mut self, display: &str) {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(display.to_string());
    }
}
