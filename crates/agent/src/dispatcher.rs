//! Command dispatch: turns a parsed [`Command`] into a reply.

use std::sync::Arc;

use atlas_config::AppConfig;
use atlas_core::message::ConversationId;
use atlas_core::provider::Provider;
use atlas_memory::{ActivityTracker, ConversationStore};
use atlas_tools::{FactSources, random_fallback_quote};
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::pipeline::{CompletionSettings, ResponsePipeline};
use crate::replies;

pub struct Dispatcher {
    config: Arc<AppConfig>,
    store: Arc<ConversationStore>,
    tracker: Arc<ActivityTracker>,
    facts: FactSources,
    pipeline: ResponsePipeline,
}

impl Dispatcher {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<ConversationStore>,
        tracker: Arc<ActivityTracker>,
        facts: FactSources,
        pipeline: ResponsePipeline,
    ) -> Self {
        Self {
            config,
            store,
            tracker,
            facts,
            pipeline,
        }
    }

    /// Wire fresh stores and a pipeline from configuration.
    pub fn from_config(
        config: Arc<AppConfig>,
        provider: Arc<dyn Provider>,
        facts: FactSources,
    ) -> Self {
        let store = Arc::new(ConversationStore::new(
            config.system_prompt(),
            config.conversation.history_cap,
        ));
        let tracker = Arc::new(ActivityTracker::new());
        let pipeline = ResponsePipeline::new(
            provider,
            store.clone(),
            CompletionSettings::from(&config.provider),
        );
        Self::new(config, store, tracker, facts, pipeline)
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn tracker(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    /// Count the message, route it, and return the reply text.
    pub async fn handle(&self, id: &ConversationId, text: &str) -> String {
        self.tracker.record_message(id);
        let command = Command::parse(text);
        if let Some(keyword) = command.keyword() {
            info!(conversation = %id, command = keyword, "Command received");
        }
        self.dispatch(id, command).await
    }

    async fn dispatch(&self, id: &ConversationId, command: Command) -> String {
        match command {
            Command::Help => replies::help(&self.config),
            Command::Info => replies::info(&self.config),
            Command::Ping => replies::PING.to_string(),
            Command::Joke => match self.facts.joke.fetch().await {
                Ok(fact) => replies::joke(&fact),
                Err(e) => {
                    warn!(source = self.facts.joke.name(), error = %e, "Joke fetch failed");
                    replies::JOKE_UNAVAILABLE.to_string()
                }
            },
            Command::Quote => {
                let fact = match self.facts.quote.fetch().await {
                    Ok(fact) => fact,
                    Err(e) => {
                        warn!(
                            source = self.facts.quote.name(),
                            error = %e,
                            "Quote fetch failed, using local pool"
                        );
                        random_fallback_quote()
                    }
                };
                replies::quote(&fact)
            }
            Command::Stats => replies::stats(self.tracker.summarize(id).as_ref()),
            Command::Clear => {
                self.store.clear(id);
                debug!(conversation = %id, "History cleared");
                replies::CLEARED.to_string()
            }
            Command::Freeform(text) => {
                self.tracker.record_ai_query(id);
                self.pipeline.respond(id, &text).await
            }
        }
    }
}
