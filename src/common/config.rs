//! Configuration file handling
//!
//! The effective configuration is layered: built-in defaults, then the first
//! config file found, then `TESTMYBOT_*` environment variables, then whatever
//! the caller passes in as [`ConfigOverrides`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::find_config_file;
use super::{Error, Result};

/// Environment prefix for capability overrides (`TESTMYBOT_CAP_CONTAINERMODE=echo`)
const ENV_CAP_PREFIX: &str = "TESTMYBOT_CAP_";
/// Environment prefix for container environment variables
const ENV_ENV_PREFIX: &str = "TESTMYBOT_ENV_";
const ENV_CONVO_DIR: &str = "TESTMYBOT_CONVO_DIR";
const ENV_BOT_REPLY_MS: &str = "TESTMYBOT_BOT_REPLY_MS";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Settings handed to the bot driver
    #[serde(default)]
    pub botium: BotiumConfig,

    /// Where conversation scripts live
    #[serde(default)]
    pub convos: ConvoConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Driver settings: capabilities select and tune the container,
/// envs are exported to it, sources describe where the bot code comes from
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct BotiumConfig {
    #[serde(default)]
    pub capabilities: BTreeMap<String, Value>,

    #[serde(default)]
    pub envs: BTreeMap<String, String>,

    #[serde(default)]
    pub sources: BTreeMap<String, Value>,
}

impl BotiumConfig {
    /// Get a capability as a string, if it is one
    pub fn capability_str(&self, name: &str) -> Option<&str> {
        self.capabilities.get(name).and_then(Value::as_str)
    }
}

/// Conversation discovery settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConvoConfig {
    /// Directory searched (recursively) for conversation files
    #[serde(default = "default_convo_dir")]
    pub dir: PathBuf,

    /// File name suffixes that mark a conversation file
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ConvoConfig {
    fn default() -> Self {
        Self {
            dir: default_convo_dir(),
            extensions: default_extensions(),
        }
    }
}

fn default_convo_dir() -> PathBuf {
    PathBuf::from("spec/convo")
}

fn default_extensions() -> Vec<String> {
    vec!["convo.yml".to_string(), "convo.yaml".to_string()]
}

/// Timeout settings in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Timeouts {
    /// Default time to wait for a bot reply
    #[serde(default = "default_bot_reply")]
    pub bot_reply_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            bot_reply_ms: default_bot_reply(),
        }
    }
}

fn default_bot_reply() -> u64 {
    10_000
}

/// Explicit settings supplied by the caller; these win over every other layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub capabilities: BTreeMap<String, Value>,
    pub envs: BTreeMap<String, String>,
    pub sources: BTreeMap<String, Value>,
    pub convo_dir: Option<PathBuf>,
    pub bot_reply_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Set a single capability
    pub fn capability(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.capabilities.insert(name.into(), value.into());
        self
    }
}

/// Interpret a raw capability value: JSON when it parses, a string otherwise
pub fn capability_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl Config {
    /// Resolve the effective configuration for the current directory and process environment
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut config = match find_config_file(&cwd) {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        config.merge_env(std::env::vars())?;
        config.apply(overrides);
        Ok(config)
    }

    /// Load configuration from a TOML file; missing sections take their defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::ConfigParse(format!("{}: {}", path.display(), e)))
    }

    /// Layer `TESTMYBOT_*` variables on top of this configuration
    ///
    /// Capability values that parse as JSON are stored as JSON,
    /// everything else is stored as a plain string.
    pub fn merge_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(name) = key.strip_prefix(ENV_CAP_PREFIX) {
                self.botium
                    .capabilities
                    .insert(name.to_string(), capability_value(&value));
            } else if let Some(name) = key.strip_prefix(ENV_ENV_PREFIX) {
                self.botium.envs.insert(name.to_string(), value);
            } else if key == ENV_CONVO_DIR {
                self.convos.dir = PathBuf::from(value);
            } else if key == ENV_BOT_REPLY_MS {
                self.timeouts.bot_reply_ms = value.trim().parse().map_err(|e| {
                    Error::Config(format!("{} must be a number of milliseconds: {}", key, e))
                })?;
            }
        }
        Ok(())
    }

    /// Apply caller overrides; maps merge per key
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        self.botium.capabilities.extend(overrides.capabilities);
        self.botium.envs.extend(overrides.envs);
        self.botium.sources.extend(overrides.sources);
        if let Some(dir) = overrides.convo_dir {
            self.convos.dir = dir;
        }
        if let Some(ms) = overrides.bot_reply_ms {
            self.timeouts.bot_reply_ms = ms;
        }
    }

    /// Default time to wait for a bot reply
    pub fn bot_reply_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.bot_reply_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.convos.dir, PathBuf::from("spec/convo"));
        assert_eq!(config.timeouts.bot_reply_ms, 10_000);
        assert!(config.botium.capabilities.is_empty());
    }

    #[test]
    fn test_load_file_fills_missing_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("testmybot.toml");
        std::fs::write(
            &path,
            r#"
[botium.capabilities]
CONTAINERMODE = "echo"
RETRIES = 3

[timeouts]
bot_reply_ms = 500
"#,
        )
        .unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.botium.capability_str("CONTAINERMODE"), Some("echo"));
        assert_eq!(config.botium.capabilities["RETRIES"], json!(3));
        assert_eq!(config.timeouts.bot_reply_ms, 500);
        assert_eq!(config.convos, ConvoConfig::default());
    }

    #[test]
    fn test_load_file_rejects_bad_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("testmybot.toml");
        std::fs::write(&path, "[botium\n").unwrap();
        assert!(matches!(
            Config::load_file(&path),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_env_layer() {
        let mut config = Config::default();
        config
            .merge_env(vars(&[
                ("TESTMYBOT_CAP_CONTAINERMODE", "echo"),
                ("TESTMYBOT_CAP_WAITFORBOTTIMEOUT", "2000"),
                ("TESTMYBOT_ENV_DEBUG", "1"),
                ("TESTMYBOT_CONVO_DIR", "convos"),
                ("TESTMYBOT_BOT_REPLY_MS", "250"),
                ("PATH", "/usr/bin"),
            ]))
            .unwrap();

        assert_eq!(config.botium.capabilities["CONTAINERMODE"], json!("echo"));
        assert_eq!(config.botium.capabilities["WAITFORBOTTIMEOUT"], json!(2000));
        assert_eq!(config.botium.envs["DEBUG"], "1");
        assert_eq!(config.convos.dir, PathBuf::from("convos"));
        assert_eq!(config.bot_reply_timeout(), Duration::from_millis(250));
        assert_eq!(config.botium.capabilities.len(), 2);
    }

    #[test]
    fn test_capability_value() {
        assert_eq!(capability_value("echo"), json!("echo"));
        assert_eq!(capability_value("true"), json!(true));
        assert_eq!(capability_value("[1, 2]"), json!([1, 2]));
    }

    #[test]
    fn test_env_rejects_bad_timeout() {
        let mut config = Config::default();
        let err = config
            .merge_env(vars(&[("TESTMYBOT_BOT_REPLY_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides_win_and_merge_per_key() {
        let mut config = Config::default();
        config.botium.capabilities.insert("A".into(), json!("file"));
        config.botium.capabilities.insert("B".into(), json!("file"));
        config
            .merge_env(vars(&[("TESTMYBOT_CAP_B", "env")]))
            .unwrap();

        config.apply(ConfigOverrides {
            bot_reply_ms: Some(42),
            ..ConfigOverrides::default().capability("A", "user")
        });

        assert_eq!(config.botium.capabilities["A"], json!("user"));
        assert_eq!(config.botium.capabilities["B"], json!("env"));
        assert_eq!(config.timeouts.bot_reply_ms, 42);
        assert_eq!(config.convos.dir, PathBuf::from("spec/convo"));
    }
}
