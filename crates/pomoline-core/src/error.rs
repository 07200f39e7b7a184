//! Core error types for pomoline-core.
//!
//! This module defines the error hierarchy using thiserror. Every error is
//! raised synchronously at the point of the invalid call; the core never
//! retries and never corrects state on the caller's behalf.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionState;

/// Core error type for pomoline-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An operation was invoked from a state that does not permit it.
    /// No state was mutated.
    #[error("{}", transition_message(.operation, .state))]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    /// Internal state holds a value outside the four canonical states.
    /// Indicates corrupted invariants; hosts should log it as fatal.
    #[error("Invalid session state: {0}")]
    InvalidState(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The task prompt could not supply a description
    #[error("Task prompt failed: {0}")]
    Prompt(String),

    /// The session actor is no longer running
    #[error("Session is closed")]
    SessionClosed,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn transition_message(operation: &str, state: &SessionState) -> String {
    match operation {
        "start_break" => "Not complete".to_string(),
        _ => format!("Cannot {operation} while {}", state.name()),
    }
}

impl CoreError {
    /// True for rejected commands the host should simply report to the user.
    pub fn is_rejected_command(&self) -> bool {
        matches!(self, CoreError::InvalidTransition { .. })
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration directory could not be resolved or created
    #[error("Configuration directory unavailable: {0}")]
    DataDir(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
