//! CLI command handling
//!
//! Resolves configuration, builds the orchestrator and formats output.

use crate::bot::TestMyBot;
use crate::commands::{Commands, OverrideArgs};
use crate::common::config::{capability_value, Config, ConfigOverrides};
use crate::common::{Error, Result};
use crate::convo::{ConvoReader, ConvoSource};
use crate::hooks::Hooks;
use crate::testing::{self, RunOptions};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            overrides,
            filter,
            verbose,
        } => {
            let config = Config::resolve(overrides.into_overrides()?)?;
            let mut bot = TestMyBot::new(config, Hooks::new())?;

            let report = testing::run_suite(&mut bot, &RunOptions { filter, verbose }).await?;
            if report.success() {
                Ok(())
            } else {
                Err(Error::TestAssertion(format!(
                    "{} of {} test case(s) failed{}",
                    report.failed(),
                    report.cases.len(),
                    if report.teardown_error.is_some() {
                        " and suite teardown failed"
                    } else {
                        ""
                    }
                )))
            }
        }

        Commands::List { overrides } => {
            let config = Config::resolve(overrides.into_overrides()?)?;
            let reader = ConvoReader::new(&config.convos);
            let convos = reader.read_convos()?;

            if convos.is_empty() {
                println!("No conversations found in {}", reader.dir().display());
                return Ok(());
            }
            for convo in &convos {
                println!("{}  ({})", convo.name, convo.filename.display());
            }
            println!("\n{} conversation(s)", convos.len());
            Ok(())
        }

        Commands::Config { overrides } => {
            let config = Config::resolve(overrides.into_overrides()?)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

impl OverrideArgs {
    fn into_overrides(self) -> Result<ConfigOverrides> {
        let mut overrides = ConfigOverrides {
            convo_dir: self.convo_dir,
            bot_reply_ms: self.bot_reply_ms,
            ..ConfigOverrides::default()
        };
        for raw in &self.capabilities {
            let (key, value) = parse_capability(raw)?;
            overrides.capabilities.insert(key, value);
        }
        Ok(overrides)
    }
}

/// Parse a `KEY=VALUE` capability argument
fn parse_capability(raw: &str) -> Result<(String, serde_json::Value)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), capability_value(value)))
        }
        _ => Err(Error::Config(format!(
            "Invalid capability '{}'. Expected KEY=VALUE, e.g. --cap CONTAINERMODE=echo",
            raw
        ))),
    }
}
