//! CLI command definitions
//!
//! Defines the clap commands for the testmybot CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run every conversation as a test case against the configured bot
    Run {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Only run test cases whose name contains this string
        #[arg(long)]
        filter: Option<String>,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the conversations that would become test cases
    List {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Print the resolved configuration as JSON
    Config {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

/// Settings that win over config files and environment
#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Directory containing conversation files
    #[arg(long)]
    pub convo_dir: Option<PathBuf>,

    /// Set a capability, e.g. --cap CONTAINERMODE=echo (repeatable)
    #[arg(long = "cap", value_name = "KEY=VALUE")]
    pub capabilities: Vec<String>,

    /// Default bot reply timeout in milliseconds
    #[arg(long)]
    pub bot_reply_ms: Option<u64>,
}
