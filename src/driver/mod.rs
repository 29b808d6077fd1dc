//! Bot driver and container capabilities
//!
//! A [`Driver`] knows how to build a [`Container`]: a running instance of the
//! bot under test plus whatever environment it needs. The orchestrator only
//! ever talks to these traits, so real runtimes plug in next to the bundled
//! [`echo`] container.

pub mod echo;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::config::BotiumConfig;
use crate::common::{Error, Result};

pub use echo::{EchoContainer, EchoDriver};

/// Capability naming the container implementation to build
pub const CAP_CONTAINERMODE: &str = "CONTAINERMODE";

/// Container modes this build knows how to construct
pub const SUPPORTED_MODES: &[&str] = &[echo::MODE];

/// A message sent by the (simulated) user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_text: Option<String>,
    /// Structured content such as button payloads or attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl UserMessage {
    /// Plain text message with an optional sender
    pub fn text(text: impl Into<String>, sender: Option<&str>) -> Self {
        Self {
            sender: sender.map(str::to_string),
            message_text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// A message the bot sent back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl BotMessage {
    /// Text content, or an empty string when the bot sent none
    pub fn text(&self) -> &str {
        self.message_text.as_deref().unwrap_or("")
    }
}

/// Builds bot containers
#[async_trait]
pub trait Driver: Send + Sync {
    /// Build a fresh container; the caller owns it until it is cleaned
    async fn build(&self) -> Result<Box<dyn Container>>;
}

/// A built bot runtime
///
/// Calls arrive sequentially from the orchestrator; `clean` is called at
/// most once and nothing is called after it.
#[async_trait]
pub trait Container: Send + Sync {
    /// Bring the bot up for a test case
    async fn start(&self) -> Result<()>;

    /// Stop the bot after a test case
    async fn stop(&self) -> Result<()>;

    /// Release every resource held by the container
    async fn clean(&self) -> Result<()>;

    /// Send a plain text user message
    async fn user_says_text(&self, text: &str, sender: Option<&str>) -> Result<()>;

    /// Send a structured user message as-is
    async fn user_says(&self, message: UserMessage) -> Result<()>;

    /// Wait for the next bot message, failing with [`Error::Timeout`] after `timeout`
    async fn wait_bot_says(&self, channel: Option<&str>, timeout: Duration) -> Result<BotMessage>;
}

/// Pick the driver named by the `CONTAINERMODE` capability
pub fn from_config(config: &BotiumConfig) -> Result<Box<dyn Driver>> {
    let mode = config.capability_str(CAP_CONTAINERMODE).ok_or_else(|| {
        Error::Config(format!(
            "Capability {} is not set. Supported modes: {}",
            CAP_CONTAINERMODE,
            SUPPORTED_MODES.join(", ")
        ))
    })?;

    match mode {
        echo::MODE => Ok(Box::new(EchoDriver::from_config(config))),
        other => Err(Error::unknown_container_mode(other, SUPPORTED_MODES)),
    }
}
