//! Fact sources for Atlas: small public APIs behind the `/joke` and
//! `/quote` commands.
//!
//! Each source implements `atlas_core::FactSource` and makes exactly one
//! HTTP request per fetch; callers turn failures into fallback replies.

pub mod dad_joke;
pub mod quote;

use std::sync::Arc;
use std::time::Duration;

use atlas_core::error::FactError;
use atlas_core::fact::FactSource;

pub use dad_joke::DadJokeSource;
pub use quote::{FALLBACK_QUOTES, ZenQuoteSource, random_fallback_quote};

/// The fact sources the command router needs.
#[derive(Clone)]
pub struct FactSources {
    pub joke: Arc<dyn FactSource>,
    pub quote: Arc<dyn FactSource>,
}

/// Build the public-API sources named in config.
pub fn default_sources(config: &atlas_config::FactsConfig) -> Result<FactSources, FactError> {
    let client = http_client(Duration::from_secs(config.timeout_secs))?;
    Ok(FactSources {
        joke: Arc::new(DadJokeSource::new(client.clone(), &config.joke_url)),
        quote: Arc::new(ZenQuoteSource::new(client, &config.quote_url)),
    })
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, FactError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("atlas-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FactError::Network(format!("Failed to create HTTP client: {e}")))
}
