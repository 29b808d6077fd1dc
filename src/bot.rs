//! Test lifecycle orchestrator
//!
//! [`TestMyBot`] owns the single container handle of a test run and drives it
//! through the suite and case lifecycle:
//!
//! ```text
//! Uninitialized --before_all--> Built --before_each--> Started
//!                                         ^                 |
//!                                         +---after_each----+ (Stopped)
//! Built/Started/Stopped --after_all--> Cleaned
//! ```
//!
//! Every phase first runs its hook, then delegates to the container. Case
//! setup without a container fails; case teardown without one is a no-op.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::convo::{AssertFn, ConvoReader, ConvoSource, FailFn};
use crate::driver::{self, BotMessage, Container, Driver, UserMessage};
use crate::hooks::{HookName, Hooks};
use crate::suite::{self, TestCase};

/// Where the orchestrator is in the container lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No container has been built yet
    Uninitialized,
    /// Container built, not started
    Built,
    /// Container started for a test case
    Started,
    /// Container stopped after a test case
    Stopped,
    /// Container cleaned and released
    Cleaned,
}

/// A user message for [`TestMyBot::hears`]
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    /// Plain text, optionally from a named sender
    Text {
        text: String,
        sender: Option<String>,
    },
    /// A fully structured message, dispatched as-is
    Structured(UserMessage),
}

impl UserInput {
    pub fn text_from(text: impl Into<String>, sender: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            sender: Some(sender.into()),
        }
    }
}

impl From<&str> for UserInput {
    fn from(text: &str) -> Self {
        Self::Text {
            text: text.to_string(),
            sender: None,
        }
    }
}

impl From<String> for UserInput {
    fn from(text: String) -> Self {
        Self::Text { text, sender: None }
    }
}

impl From<UserMessage> for UserInput {
    fn from(message: UserMessage) -> Self {
        Self::Structured(message)
    }
}

/// Test lifecycle orchestrator for one bot under test
pub struct TestMyBot {
    config: Config,
    hooks: Hooks,
    driver: Box<dyn Driver>,
    convos: Box<dyn ConvoSource>,
    container: Option<Box<dyn Container>>,
    state: LifecycleState,
}

impl fmt::Debug for TestMyBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMyBot")
            .field("state", &self.state)
            .field("has_container", &self.container.is_some())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl TestMyBot {
    /// Create an orchestrator from a resolved configuration
    ///
    /// The driver is chosen by the `CONTAINERMODE` capability and convos are
    /// read from `[convos] dir`.
    pub fn new(config: Config, hooks: Hooks) -> Result<Self> {
        let driver = driver::from_config(&config.botium)?;
        let convos = Box::new(ConvoReader::new(&config.convos));
        debug!(?config, "testmybot configuration");
        Ok(Self::with_parts(config, hooks, driver, convos))
    }

    /// Create an orchestrator from explicit collaborators
    pub fn with_parts(
        config: Config,
        hooks: Hooks,
        driver: Box<dyn Driver>,
        convos: Box<dyn ConvoSource>,
    ) -> Self {
        Self {
            config,
            hooks,
            driver,
            convos,
            container: None,
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    /// Default time to wait for a bot reply
    pub fn reply_timeout(&self) -> Duration {
        self.config.bot_reply_timeout()
    }

    /// The active container, or [`Error::ContainerNotAvailable`]
    pub fn container(&self) -> Result<&dyn Container> {
        self.container.as_deref().ok_or(Error::ContainerNotAvailable)
    }

    fn call_hook(&self, name: HookName) {
        self.hooks.invoke(name, self, None);
    }

    /// Suite setup: build the container
    ///
    /// A container left over from an earlier suite setup is cleaned first.
    pub async fn before_all(&mut self) -> Result<()> {
        self.call_hook(HookName::BeforeAllPre);

        if let Some(stale) = self.container.take() {
            warn!("suite setup called with a live container; cleaning it first");
            if let Err(e) = stale.clean().await {
                warn!(error = %e, "cleaning previous container failed");
            }
        }

        match self.driver.build().await {
            Ok(container) => {
                self.container = Some(container);
                self.state = LifecycleState::Built;
                debug!("container built");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "container build failed");
                Err(e)
            }
        }
    }

    /// Suite teardown: clean the container and drop the handle
    ///
    /// The handle is gone afterwards even when cleaning fails.
    pub async fn after_all(&mut self) -> Result<()> {
        self.call_hook(HookName::AfterAllPre);

        let Some(container) = self.container.take() else {
            return Ok(());
        };
        self.state = LifecycleState::Cleaned;

        let result = container.clean().await;
        if let Err(e) = &result {
            warn!(error = %e, "container clean failed");
        }
        result
    }

    /// Case setup: start the container
    pub async fn before_each(&mut self) -> Result<()> {
        self.call_hook(HookName::BeforeEachPre);

        self.container()?.start().await?;
        self.state = LifecycleState::Started;
        Ok(())
    }

    /// Case teardown: stop the container, if there is one
    pub async fn after_each(&mut self) -> Result<()> {
        self.call_hook(HookName::AfterEachPre);

        let Some(container) = self.container.as_deref() else {
            debug!("no container to stop after test case");
            return Ok(());
        };
        container.stop().await?;
        self.state = LifecycleState::Stopped;
        Ok(())
    }

    /// Read all convos and register one test case per convo
    ///
    /// Returns the number of registered test cases.
    pub fn setup_test_suite<R>(
        &self,
        register: R,
        on_assert: Arc<AssertFn>,
        on_fail: Arc<FailFn>,
    ) -> Result<usize>
    where
        R: FnMut(String, TestCase),
    {
        let convos = self.convos.read_convos()?;
        let count = convos.len();
        suite::generate(convos, register, on_assert, on_fail);
        Ok(count)
    }

    /// Send a user message to the bot
    pub async fn hears(&self, input: impl Into<UserInput>) -> Result<()> {
        let container = self.container()?;
        match input.into() {
            UserInput::Text { text, sender } => {
                container.user_says_text(&text, sender.as_deref()).await
            }
            UserInput::Structured(message) => container.user_says(message).await,
        }
    }

    /// Wait for the bot's next message on `channel`
    pub async fn says(&self, channel: Option<&str>, timeout: Duration) -> Result<BotMessage> {
        self.container()?.wait_bot_says(channel, timeout).await
    }
}
