//! Dad joke source: icanhazdadjoke.com JSON API.

use async_trait::async_trait;
use atlas_core::error::FactError;
use atlas_core::fact::{Fact, FactSource};
use serde::Deserialize;
use tracing::debug;

pub struct DadJokeSource {
    client: reqwest::Client,
    url: String,
}

impl DadJokeSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    fn parse(body: &str) -> Result<Fact, FactError> {
        let payload: JokePayload =
            serde_json::from_str(body).map_err(|e| FactError::Malformed(e.to_string()))?;
        let joke = payload.joke.trim();
        if joke.is_empty() {
            return Err(FactError::Malformed("empty joke".into()));
        }
        Ok(Fact::new(joke))
    }
}

#[derive(Debug, Deserialize)]
struct JokePayload {
    joke: String,
}

#[async_trait]
impl FactSource for DadJokeSource {
    fn name(&self) -> &str {
        "dad_joke"
    }

    async fn fetch(&self) -> Result<Fact, FactError> {
        debug!(url = %self.url, "Fetching dad joke");
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
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
