//! Conversation file types
//!
//! Defines the data structures for deserializing YAML conversation scripts.

use serde::Deserialize;
use serde_json::Value;

/// A conversation script as written on disk
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ConvoFile {
    /// Name of the conversation; defaults to the file stem
    pub name: Option<String>,
    /// Optional description of what the conversation verifies
    pub description: Option<String>,
    /// The alternating user and bot turns
    pub steps: Vec<ConvoStep>,
}

/// A single turn in a conversation
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum ConvoStep {
    /// The user says something
    Me {
        /// Plain text to send
        text: Option<String>,
        /// Structured content (buttons, quick replies, attachments)
        payload: Option<Value>,
        /// Sender identity attached to the message
        sender: Option<String>,
        /// Channel to send on
        channel: Option<String>,
    },
    /// The bot is expected to answer
    Bot {
        /// Channel to listen on
        channel: Option<String>,
        /// Overrides the configured reply timeout
        timeout_ms: Option<u64>,
        /// What the reply must look like; any reply passes when absent
        expect: Option<ReplyExpectation>,
    },
    /// Wait before the next turn
    Pause {
        millis: u64,
    },
}

/// Expectations for a bot reply
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReplyExpectation {
    /// Expected text (exact match, surrounding whitespace ignored)
    pub equals: Option<String>,
    /// Substring that must appear in the text
    pub contains: Option<String>,
    /// Substring that must not appear in the text
    pub not_contains: Option<String>,
    /// Expected structured payload
    pub payload: Option<Value>,
}
