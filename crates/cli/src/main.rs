//! Atlas CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a default config file
//! - `run`: Start the chat bridge on the terminal channel
//! - `ask`: Route a single message and print the reply
//! - `doctor`: Check the API key, the provider and the fact APIs

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "atlas",
    about = "Atlas — AI chat bridge with commands and conversation memory",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.atlas/config.toml with default settings
    Init,

    /// Start the bot and answer messages until stopped
    Run,

    /// Route one message (command or freeform) and print the reply
    Ask {
        /// The message text
        #[arg(short, long)]
        message: String,
    },

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Run => commands::run::run().await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
