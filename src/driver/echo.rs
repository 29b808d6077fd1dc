//! In-process echo container
//!
//! Answers every user message with `ECHO_PREFIX` + the message text, which is
//! enough to exercise the whole lifecycle and conversation machinery without a
//! real bot runtime.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};

use super::{BotMessage, Container, Driver, UserMessage};
use crate::common::config::BotiumConfig;
use crate::common::{Error, Result};

/// `CONTAINERMODE` value selecting this container
pub const MODE: &str = "echo";

/// Capability overriding the reply prefix
pub const CAP_ECHO_PREFIX: &str = "ECHO_PREFIX";

const DEFAULT_PREFIX: &str = "You said: ";

/// Sender name stamped on every reply
const BOT_SENDER: &str = "bot";

/// Builds [`EchoContainer`]s
#[derive(Debug, Clone)]
pub struct EchoDriver {
    prefix: String,
}

impl EchoDriver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &BotiumConfig) -> Self {
        Self::new(
            config
                .capability_str(CAP_ECHO_PREFIX)
                .unwrap_or(DEFAULT_PREFIX),
        )
    }
}

impl Default for EchoDriver {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[async_trait]
impl Driver for EchoDriver {
    async fn build(&self) -> Result<Box<dyn Container>> {
        debug!(prefix = %self.prefix, "building echo container");
        Ok(Box::new(EchoContainer::new(self.prefix.clone())))
    }
}

#[derive(Debug, Default)]
struct EchoState {
    running: bool,
    cleaned: bool,
}

impl EchoState {
    fn check_usable(&self) -> Result<()> {
        if self.cleaned {
            return Err(Error::Container(
                "echo container has been cleaned".to_string(),
            ));
        }
        Ok(())
    }

    fn check_running(&self) -> Result<()> {
        self.check_usable()?;
        if !self.running {
            return Err(Error::Container(
                "echo container is not started. Run case setup first".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reply side of the container
///
/// Replies read off the queue while waiting on another channel are parked in
/// `held`, in arrival order, until someone waits on their channel.
struct Inbox {
    rx: mpsc::UnboundedReceiver<BotMessage>,
    held: VecDeque<BotMessage>,
}

impl Inbox {
    fn take_held(&mut self, channel: Option<&str>) -> Option<BotMessage> {
        let pos = self
            .held
            .iter()
            .position(|msg| channel_matches(msg, channel))?;
        self.held.remove(pos)
    }

    /// Drop everything queued or held; returns how many replies were dropped
    fn drain(&mut self) -> usize {
        let mut dropped = self.held.len();
        self.held.clear();
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

fn channel_matches(msg: &BotMessage, channel: Option<&str>) -> bool {
    channel.is_none() || msg.channel.as_deref() == channel
}

/// Container that echoes user messages back as bot messages
pub struct EchoContainer {
    prefix: String,
    state: Mutex<EchoState>,
    replies_tx: mpsc::UnboundedSender<BotMessage>,
    inbox: Mutex<Inbox>,
}

impl EchoContainer {
    pub fn new(prefix: impl Into<String>) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        Self {
            prefix: prefix.into(),
            state: Mutex::new(EchoState::default()),
            replies_tx,
            inbox: Mutex::new(Inbox {
                rx: replies_rx,
                held: VecDeque::new(),
            }),
        }
    }

    /// Whether the container is currently started
    pub async fn is_running(&self) -> bool {
        self.state.lock().await.running
    }

    async fn reply(&self, message: &UserMessage) -> Result<()> {
        self.state.lock().await.check_running()?;

        let reply = match (&message.message_text, &message.payload) {
            (Some(text), _) => BotMessage {
                message_text: Some(format!("{}{}", self.prefix, text)),
                ..BotMessage::default()
            },
            (None, Some(payload)) => BotMessage {
                payload: Some(payload.clone()),
                ..BotMessage::default()
            },
            (None, None) => {
                return Err(Error::Container(
                    "user message has neither text nor payload".to_string(),
                ))
            }
        };

        let reply = BotMessage {
            sender: Some(BOT_SENDER.to_string()),
            channel: message.channel.clone(),
            ..reply
        };
        trace!(?reply, "echo reply queued");
        self.replies_tx
            .send(reply)
            .map_err(|_| Error::Container("echo reply queue closed".to_string()))
    }
}

#[async_trait]
impl Container for EchoContainer {
    async fn start(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check_usable()?;
        state.running = true;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check_usable()?;
        state.running = false;

        // Replies left over from one case must not leak into the next
        let dropped = self.inbox.lock().await.drain();
        if dropped > 0 {
            debug!(dropped, "discarded unread echo replies on stop");
        }
        Ok(())
    }

    async fn clean(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.running = false;
        state.cleaned = true;
        let mut inbox = self.inbox.lock().await;
        inbox.held.clear();
        inbox.rx.close();
        Ok(())
    }

    async fn user_says_text(&self, text: &str, sender: Option<&str>) -> Result<()> {
        self.reply(&UserMessage::text(text, sender)).await
    }

    async fn user_says(&self, message: UserMessage) -> Result<()> {
        self.reply(&message).await
    }

    async fn wait_bot_says(&self, channel: Option<&str>, timeout: Duration) -> Result<BotMessage> {
        self.state.lock().await.check_usable()?;

        let mut inbox = self.inbox.lock().await;
        if let Some(msg) = inbox.take_held(channel) {
            return Ok(msg);
        }

        let wait = async {
            loop {
                match inbox.rx.recv().await {
                    Some(msg) if channel_matches(&msg, channel) => return Ok(msg),
                    Some(msg) => {
                        trace!(
                            expected = ?channel,
                            got = ?msg.channel,
                            "holding echo reply for another channel"
                        );
                        inbox.held.push_back(msg);
                    }
                    None => {
                        return Err(Error::Container("echo reply queue closed".to_string()))
                    }
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| Error::Timeout(timeout.as_millis() as u64))?
    }
}
