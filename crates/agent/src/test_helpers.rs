//! Shared test doubles for the provider and fact sources.

use std::sync::Mutex;

use atlas_core::error::{FactError, ProviderError};
use atlas_core::fact::{Fact, FactSource};
use atlas_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};

type Scripted = Result<Option<String>, ProviderError>;

/// A provider that answers from a queue of scripted outcomes and records
/// every request it sees.
///
/// Panics if more calls are made than outcomes provided.
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Scripted>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Successful text replies, in order.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(Some(t.to_string()))).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };

        let outcomes = self.outcomes.lock().unwrap();
        let outcome = outcomes.get(call).cloned().unwrap_or_else(|| {
            panic!(
                "ScriptedProvider: no more outcomes (call #{call}, have {})",
                outcomes.len()
            )
        });

        outcome.map(|content| ProviderResponse {
            content,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
        })
    }
}

/// A fact source that always returns the same fact, or always fails.
pub struct StaticFactSource {
    fact: Option<Fact>,
    calls: Mutex<usize>,
}

impl StaticFactSource {
    pub fn ok(fact: Fact) -> Self {
        Self {
            fact: Some(fact),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fact: None,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl FactSource for StaticFactSource {
    fn name(&self) -> &str {
        "static_mock"
    }

    async fn fetch(&self) -> Result<Fact, FactError> {
        *self.calls.lock().unwrap() += 1;
        self.fact
            .clone()
            .ok_or_else(|| FactError::Network("connection refused".into()))
    }
}
