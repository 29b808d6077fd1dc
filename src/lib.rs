//! testmybot - conversation-driven chatbot testing
//!
//! Turns conversation scripts into test cases and runs them against a bot
//! container that is built, started, stopped and cleaned around them.

pub mod bot;
pub mod cli;
pub mod commands;
pub mod common;
pub mod convo;
pub mod driver;
pub mod hooks;
pub mod suite;
pub mod testing;

// Re-export commonly used types for tests
pub use bot::{LifecycleState, TestMyBot, UserInput};
pub use common::{Error, Result};
pub use hooks::{HookName, Hooks};
pub use suite::{TestCase, TestOutcome};
