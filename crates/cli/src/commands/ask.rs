//! `atlas ask`: Route a single message and print the reply.

use std::sync::Arc;

use atlas_agent::Dispatcher;
use atlas_channels::cli::CLI_CONVERSATION;
use atlas_config::AppConfig;
use atlas_core::message::ConversationId;

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.require_api_key()?;
    let config = Arc::new(config);

    let provider = atlas_providers::build_from_config(&config)?;
    let facts = atlas_tools::default_sources(&config.facts)?;
    let dispatcher = Dispatcher::from_config(config, provider, facts);

    eprint!("  Thinking...");
    let reply = dispatcher
        .handle(&ConversationId::from(CLI_CONVERSATION), &message)
        .await;
    eprint!("\r              \r");
    println!("{reply}");

    Ok(())
}
