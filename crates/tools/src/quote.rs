//! Inspirational quote source: ZenQuotes `/api/random`, plus the local
//! pool used when the API is unavailable.

use async_trait::async_trait;
use atlas_core::error::FactError;
use atlas_core::fact::{Fact, FactSource};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use tracing::debug;

/// Quote/author pairs served when the quote API cannot be reached.
pub const FALLBACK_QUOTES: [(&str, &str); 4] = [
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Innovation distinguishes between a leader and a follower.", "Steve Jobs"),
    ("Stay hungry, stay foolish.", "Steve Jobs"),
    ("Life is what happens when you're busy making other plans.", "John Lennon"),
];

/// Pick one fallback quote uniformly at random.
pub fn random_fallback_quote() -> Fact {
    let mut rng = rand::rng();
    let (text, author) = FALLBACK_QUOTES
        .choose(&mut rng)
        .copied()
        .unwrap_or(FALLBACK_QUOTES[0]);
    Fact::attributed(text, author)
}

pub struct ZenQuoteSource {
    client: reqwest::Client,
    url: String,
}

impl ZenQuoteSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The API answers with a one-element array: `[{"q": ..., "a": ..., "h": ...}]`.
    fn parse(body: &str) -> Result<Fact, FactError> {
        let payload: Vec<QuotePayload> =
            serde_json::from_str(body).map_err(|e| FactError::Malformed(e.to_string()))?;
        let first = payload
            .into_iter()
            .next()
            .ok_or_else(|| FactError::Malformed("empty quote list".into()))?;
        Ok(Fact::attributed(first.q.trim(), first.a.trim()))
    }
}

#[derive(Debug, Deserialize)]
struct QuotePayload {
    q: String,
    a: String,
}

#[async_trait]
impl FactSource for ZenQuoteSource {
    fn name(&self) -> &str {
        "zen_quote"
    }

    async fn fetch(&self) -> Result<Fact, FactError> {
        debug!(url = %self.url, "Fetching quote");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FactError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FactError::Status(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FactError::Network(e.to_string()))?;
        Self::parse(&body)
    }
}
