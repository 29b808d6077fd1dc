//! Error types for testmybot
//!
//! Messages are meant to be read by whoever is running the suite, so most
//! variants carry a hint about what to fix.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testmybot
#[derive(Error, Debug)]
pub enum Error {
    // === Container Lifecycle Errors ===
    #[error("container not available")]
    ContainerNotAvailable,

    #[error("Failed to build bot container: {0}")]
    Build(String),

    #[error("Bot container error: {0}")]
    Container(String),

    #[error("Unknown container mode '{mode}'. Supported modes: {supported}")]
    UnknownContainerMode { mode: String, supported: String },

    // === Conversation Errors ===
    #[error("Conversation '{convo}' failed at {step}: {reason}")]
    ConversationFailed {
        convo: String,
        step: String,
        reason: String,
    },

    #[error("Failed to parse conversation '{path}': {error}")]
    ConvoParse { path: String, error: String },

    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    #[error("No bot reply within {0} ms")]
    Timeout(u64),

    // === Hook Errors ===
    #[error("Unknown hook '{0}'. Known hooks: beforeAllPre, afterAllPre, beforeEachPre, afterEachPre")]
    UnknownHook(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a conversation failure error
    pub fn conversation_failed(convo: &str, step: &str, reason: impl ToString) -> Self {
        Self::ConversationFailed {
            convo: convo.to_string(),
            step: step.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown container mode error listing the supported modes
    pub fn unknown_container_mode<S: AsRef<str>>(mode: &str, supported: &[S]) -> Self {
        Self::UnknownContainerMode {
            mode: mode.to_string(),
            supported: supported
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Whether this error means the lifecycle never produced a container
    pub fn is_container_not_available(&self) -> bool {
        matches!(self, Self::ContainerNotAvailable)
    }
}
