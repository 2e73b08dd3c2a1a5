//! `atlas run`: Start the bridge on the terminal channel.

use std::sync::Arc;

use atlas_agent::{Dispatcher, MessageLog, MessageRunner};
use atlas_channels::{CliChannel, ReconnectPolicy, Supervisor};
use atlas_config::AppConfig;
use atlas_core::channel::Channel;
use atlas_core::error::ChannelError;
use tokio::signal;
use tracing::{info, warn};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;

    print_banner(&config);

    let provider = atlas_providers::build_from_config(&config)?;
    let facts = atlas_tools::default_sources(&config.facts)?;
    let dispatcher = Arc::new(Dispatcher::from_config(config.clone(), provider, facts));

    let mut runner = MessageRunner::new(dispatcher);
    match MessageLog::open(&config.logging.message_log, &config.bot_name) {
        Ok(log) => runner = runner.with_log(Arc::new(log)),
        Err(e) => warn!(
            path = %config.logging.message_log.display(),
            error = %e,
            "Message log unavailable, continuing without it"
        ),
    }

    let channel: Arc<dyn Channel> = Arc::new(CliChannel::new().with_prompt(&config.bot_name));
    let supervisor = Supervisor::new(channel.clone(), ReconnectPolicy::from(&config.reconnect));

    println!("  Type your message and press Enter. Try /help.");
    println!("  Type 'exit' or Ctrl+C to quit.\n");

    tokio::select! {
        result = supervisor.run(&runner) => match result {
            Ok(()) => info!("Session ended"),
            Err(ChannelError::LoggedOut(reason)) => {
                eprintln!("❌ Logged out ({reason}). Re-authenticate the channel and restart.");
                return Err(ChannelError::LoggedOut(reason).into());
            }
            Err(e) => {
                eprintln!("❌ {e}. Please restart the bot manually.");
                return Err(e.into());
            }
        },
        () = shutdown_signal() => {}
    }

    channel.stop().await?;
    println!("\n✅ Bot stopped gracefully.");
    Ok(())
}

/// Load config and insist on an API key, printing setup help if it is missing.
fn load_config() -> Result<Arc<AppConfig>, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Err(e) = config.require_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Add it to a .env file in the working directory:");
        eprintln!("    GROQ_API_KEY=gsk_...");
        eprintln!();
        eprintln!("  Or set api_key in your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get a Groq key at: https://console.groq.com/keys");
        eprintln!();
        return Err(e.into());
    }

    Ok(Arc::new(config))
}

fn print_banner(config: &AppConfig) {
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║{:^46}║", format!("{} - CHAT BRIDGE", config.bot_name));
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  🤖 Bot Name:    {}", config.bot_name);
    println!("  🔢 Version:     {}", config.version);
    println!("  🧠 AI Model:    {}", config.provider.model);
    println!("  📝 Message log: {}", config.logging.message_log.display());
    println!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
