//! `atlas doctor`: Diagnose configuration and connectivity.

use std::path::Path;

use atlas_agent::MessageLog;
use atlas_config::AppConfig;
use atlas_core::message::Turn;
use atlas_core::provider::ProviderRequest;

/// Keys shorter than this are almost certainly truncated or placeholders.
const MIN_KEY_LEN: usize = 20;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Atlas Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ℹ️  No config file, using defaults (run `atlas init` to create one)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config and re-run.");
            return outcome(1);
        }
    };

    match config.require_api_key() {
        Ok(key) if key.len() > MIN_KEY_LEN => println!("  ✅ API key configured"),
        Ok(_) => {
            println!("  ⚠️  API key looks too short — check GROQ_API_KEY");
            issues += 1;
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    match atlas_providers::build_from_config(&config) {
        Ok(provider) => {
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable: {}", provider.name()),
                Ok(false) => {
                    println!("  ❌ Provider unhealthy: {}", provider.name());
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider check failed: {e}");
                    issues += 1;
                }
            }

            let mut request = ProviderRequest::new(
                &config.provider.model,
                vec![Turn::user("Say 'Hello! API is working!' in exactly those words.")],
            );
            request.max_tokens = Some(50);
            match provider.complete(request).await {
                Ok(response) => println!(
                    "  ✅ Completion works: {}",
                    response.content.unwrap_or_default()
                ),
                Err(e) => {
                    println!("  ❌ Completion failed: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Could not build provider: {e}");
            issues += 1;
        }
    }

    match atlas_tools::default_sources(&config.facts) {
        Ok(sources) => {
            for source in [&sources.joke, &sources.quote] {
                match source.fetch().await {
                    Ok(_) => println!("  ✅ Fact API reachable: {}", source.name()),
                    Err(e) => println!("  ⚠️  Fact API {} failed: {e}", source.name()),
                }
            }
        }
        Err(e) => {
            println!("  ❌ Could not build fact sources: {e}");
            issues += 1;
        }
    }

    if !message_log_writable(&config.logging.message_log, &config.bot_name) {
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    outcome(issues)
}

/// Open the message log the way `run` does and report whether that worked.
fn message_log_writable(path: &Path, bot_name: &str) -> bool {
    match MessageLog::open(path, bot_name) {
        Ok(_) => {
            println!("  ✅ Message log writable: {}", path.display());
            true
        }
        Err(e) => {
            println!("  ❌ Message log not writable ({}): {e}", path.display());
            false
        }
    }
}

/// Any failed check makes the command exit non-zero.
fn outcome(issues: usize) -> Result<(), Box<dyn std::error::Error>> {
    if issues == 0 {
        Ok(())
    } else {
        Err(format!("doctor found {issues} issue(s)").into())
    }
}
