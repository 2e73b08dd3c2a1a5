//! FactSource trait: parameterless fetches of a small piece of content
//! (a joke, a quote) from a public API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FactError;

/// A fetched piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// The body text
    pub text: String,

    /// Attribution, when the source provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Fact {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
        }
    }

    pub fn attributed(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: Some(author.into()),
        }
    }
}

#[async_trait]
pub trait FactSource: Send + Sync {
    /// Short name used in logs (e.g., "dad_joke").
    fn name(&self) -> &str;

    /// Fetch one fact. Never retried by callers.
    async fn fetch(&self) -> std::result::Result<Fact, FactError>;
}
