//! Conversation execution
//!
//! Plays a [`Convo`] against a container turn by turn. Reply checks go through
//! the caller's assert callback; container failures (send errors, reply
//! timeouts) are reported through the fail callback and end the conversation.

use std::time::Duration;

use tracing::{debug, trace};

use super::{Convo, ConvoStep, ReplyExpectation};
use crate::common::{Error, Result};
use crate::driver::{BotMessage, Container, UserMessage};

/// Checks a bot reply against an expectation; the last argument names the step
pub type AssertFn = dyn Fn(&BotMessage, &ReplyExpectation, &str) -> Result<()> + Send + Sync;

/// Receives a description of a conversation-level failure
pub type FailFn = dyn Fn(&str) + Send + Sync;

impl Convo {
    /// Run every step against `container`
    ///
    /// `reply_timeout` applies to bot steps that don't set their own.
    pub async fn run(
        &self,
        container: &dyn Container,
        reply_timeout: Duration,
        on_assert: &AssertFn,
        on_fail: &(dyn Fn(&str) + Send + Sync + '_),
    ) -> Result<()> {
        for (i, step) in self.steps.iter().enumerate() {
            let tag = format!("{}/step {}", self.name, i + 1);
            trace!(step = %tag, turn = ?step, "executing convo step");

            match step {
                ConvoStep::Me {
                    text,
                    payload,
                    sender,
                    channel,
                } => {
                    let sent = match (text, payload, channel) {
                        (Some(text), None, None) => {
                            container.user_says_text(text, sender.as_deref()).await
                        }
                        _ => {
                            container
                                .user_says(UserMessage {
                                    sender: sender.clone(),
                                    channel: channel.clone(),
                                    message_text: text.clone(),
                                    payload: payload.clone(),
                                })
                                .await
                        }
                    };
                    if let Err(e) = sent {
                        return Err(self.fail(on_fail, &tag, e));
                    }
                }
                ConvoStep::Bot {
                    channel,
                    timeout_ms,
                    expect,
                } => {
                    let timeout = timeout_ms.map(Duration::from_millis).unwrap_or(reply_timeout);
                    let reply = match container.wait_bot_says(channel.as_deref(), timeout).await {
                        Ok(reply) => reply,
                        Err(e) => return Err(self.fail(on_fail, &tag, e)),
                    };
                    debug!(step = %tag, text = reply.text(), "bot says");

                    if let Some(expect) = expect {
                        on_assert(&reply, expect, &tag)?;
                    }
                }
                ConvoStep::Pause { millis } => {
                    tokio::time::sleep(Duration::from_millis(*millis)).await;
                }
            }
        }
        Ok(())
    }

    fn fail(&self, on_fail: &(dyn Fn(&str) + Send + Sync + '_), tag: &str, cause: Error) -> Error {
        let reason = cause.to_string();
        on_fail(&format!("{}: {}", tag, reason));
        Error::conversation_failed(&self.name, tag, reason)
    }
}

/// Stock reply assertion
pub fn assert_reply(reply: &BotMessage, expect: &ReplyExpectation, step: &str) -> Result<()> {
    let text = reply.text();

    if let Some(expected) = &expect.equals {
        if text.trim() != expected.trim() {
            return Err(Error::TestAssertion(format!(
                "{}: expected bot to say '{}', got '{}'",
                step, expected, text
            )));
        }
    }

    if let Some(expected_substr) = &expect.contains {
        if !text.contains(expected_substr.as_str()) {
            return Err(Error::TestAssertion(format!(
                "{}: expected bot reply containing '{}', got '{}'",
                step, expected_substr, text
            )));
        }
    }

    if let Some(forbidden) = &expect.not_contains {
        if text.contains(forbidden.as_str()) {
            return Err(Error::TestAssertion(format!(
                "{}: bot reply must not contain '{}', got '{}'",
                step, forbidden, text
            )));
        }
    }

    if let Some(expected_payload) = &expect.payload {
        if reply.payload.as_ref() != Some(expected_payload) {
            return Err(Error::TestAssertion(format!(
                "{}: expected payload {}, got {}",
                step,
                expected_payload,
                reply
                    .payload
                    .as_ref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "none".to_string())
            )));
        }
    }

    Ok(())
}
