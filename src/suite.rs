//! Test case generation
//!
//! Turns conversations into independent, named test cases. A test case looks
//! up the container when it runs, not when it is generated, so cases can be
//! registered before the suite's container exists.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::bot::TestMyBot;
use crate::common::{Error, Result};
use crate::convo::{AssertFn, Convo, FailFn};

/// How a test case ended
#[derive(Debug)]
pub enum TestOutcome {
    Passed,
    Failed(Error),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            TestOutcome::Passed => Ok(()),
            TestOutcome::Failed(e) => Err(e),
        }
    }
}

/// One runnable conversation
#[derive(Clone)]
pub struct TestCase {
    convo: Arc<Convo>,
    on_assert: Arc<AssertFn>,
    on_fail: Arc<FailFn>,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.convo.name)
            .field("file", &self.convo.filename)
            .finish()
    }
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.convo.name
    }

    /// File the conversation came from
    pub fn source(&self) -> &Path {
        &self.convo.filename
    }

    pub fn convo(&self) -> &Convo {
        &self.convo
    }

    /// Run the conversation against `bot`'s active container
    ///
    /// `done` is called exactly once with the outcome; errors never escape
    /// any other way.
    pub async fn run<F>(&self, bot: &TestMyBot, done: F)
    where
        F: FnOnce(TestOutcome),
    {
        debug!(convo = %self.name(), "running testcase");

        match self.execute(bot).await {
            Ok(()) => {
                debug!(convo = %self.name(), "testcase ready, calling done function");
                done(TestOutcome::Passed);
            }
            Err(e) => {
                debug!(convo = %self.name(), error = %e, "testcase failed");
                done(TestOutcome::Failed(e));
            }
        }
    }

    async fn execute(&self, bot: &TestMyBot) -> Result<()> {
        let container = bot.container()?;
        self.convo
            .run(container, bot.reply_timeout(), &*self.on_assert, &*self.on_fail)
            .await
    }
}

/// Register one test case per conversation, in order
///
/// Names are passed through as-is; keeping them unique is up to whoever
/// wrote the conversations.
pub fn generate<R>(
    convos: Vec<Convo>,
    mut register: R,
    on_assert: Arc<AssertFn>,
    on_fail: Arc<FailFn>,
)
where
    R: FnMut(String, TestCase),
{
    for convo in convos {
        debug!(convo = %convo.name, file = %convo.filename.display(), "adding test case");
        let name = convo.name.clone();
        register(
            name,
            TestCase {
                convo: Arc::new(convo),
                on_assert: Arc::clone(&on_assert),
                on_fail: Arc::clone(&on_fail),
            },
        );
    }
}
