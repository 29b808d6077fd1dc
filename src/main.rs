//! testmybot CLI - run conversation scripts as tests against a chatbot
//!
//! Conversations are read from YAML files, each one becomes a test case, and
//! the configured bot container is built, started, stopped and cleaned
//! around them.

use clap::Parser;
use testmybot::commands::Commands;
use testmybot::common::logging;

#[derive(Parser)]
#[command(name = "testmybot", about = "Conversation-driven chatbot testing")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    if let Err(e) = testmybot::cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
