//! Lifecycle hooks
//!
//! A [`Hooks`] map holds at most one callback for each of the four fixed hook
//! points. It is built once, handed to [`TestMyBot`] at construction and never
//! changed afterwards. Each hook runs synchronously, before the container
//! operation of its lifecycle phase starts.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::bot::TestMyBot;
use crate::common::{Error, Result};

/// Hook callback: receives the orchestrator and an optional argument
pub type HookFn = Arc<dyn Fn(&TestMyBot, Option<&Value>) + Send + Sync>;

/// The fixed hook points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookName {
    /// Before the container is built
    #[serde(rename = "beforeAllPre")]
    BeforeAllPre,
    /// Before the container is cleaned
    #[serde(rename = "afterAllPre")]
    AfterAllPre,
    /// Before the container is started for a test case
    #[serde(rename = "beforeEachPre")]
    BeforeEachPre,
    /// Before the container is stopped after a test case
    #[serde(rename = "afterEachPre")]
    AfterEachPre,
}

impl HookName {
    pub const ALL: [HookName; 4] = [
        HookName::BeforeAllPre,
        HookName::AfterAllPre,
        HookName::BeforeEachPre,
        HookName::AfterEachPre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::BeforeAllPre => "beforeAllPre",
            HookName::AfterAllPre => "afterAllPre",
            HookName::BeforeEachPre => "beforeEachPre",
            HookName::AfterEachPre => "afterEachPre",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HookName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::UnknownHook(s.to_string()))
    }
}

/// Registry of lifecycle hooks
#[derive(Clone, Default)]
pub struct Hooks {
    hooks: HashMap<HookName, HookFn>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.hooks.keys().map(HookName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Hooks").field("registered", &names).finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration; replaces any previous hook of the same name
    pub fn with<F>(mut self, name: HookName, hook: F) -> Self
    where
        F: Fn(&TestMyBot, Option<&Value>) + Send + Sync + 'static,
    {
        self.set(name, hook);
        self
    }

    /// Register `hook` under `name`, replacing any previous one
    pub fn set<F>(&mut self, name: HookName, hook: F)
    where
        F: Fn(&TestMyBot, Option<&Value>) + Send + Sync + 'static,
    {
        self.hooks.insert(name, Arc::new(hook));
    }

    pub fn get(&self, name: HookName) -> Option<&HookFn> {
        self.hooks.get(&name)
    }

    pub fn contains(&self, name: HookName) -> bool {
        self.hooks.contains_key(&name)
    }

    /// Call the hook registered under `name`, if any
    ///
    /// A missing hook is a no-op. Panics inside a hook are not caught.
    pub fn invoke(&self, name: HookName, bot: &TestMyBot, arg: Option<&Value>) {
        if let Some(hook) = self.get(name) {
            debug!(hook = %name, "calling testmybot hook");
            hook(bot, arg);
        }
    }
}
