//! The AI response pipeline: freeform text in, reply text out.
//!
//! 1. Append the user turn to the conversation history
//! 2. Build the context (system persona + capped history)
//! 3. Call the completion provider
//! 4. On success, append the assistant turn and return it
//! 5. On failure, map the error category to a user-facing string and leave
//!    the history with the dangling user turn

use std::sync::Arc;

use atlas_config::ProviderConfig;
use atlas_core::error::ProviderError;
use atlas_core::message::ConversationId;
use atlas_core::provider::{Provider, ProviderRequest};
use atlas_memory::ConversationStore;
use tracing::{debug, info, warn};

use crate::replies;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl From<&ProviderConfig> for CompletionSettings {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

pub struct ResponsePipeline {
    provider: Arc<dyn Provider>,
    store: Arc<ConversationStore>,
    settings: CompletionSettings,
}

impl ResponsePipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<ConversationStore>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings,
        }
    }

    /// Produce a reply for `user_text`. Never fails: provider errors become
    /// apology strings.
    pub async fn respond(&self, id: &ConversationId, user_text: &str) -> String {
        self.store.append_user_turn(id, user_text);
        let context = self.store.build_context(id);

        let mut request = ProviderRequest::new(&self.settings.model, context);
        request.temperature = self.settings.temperature;
        request.max_tokens = Some(self.settings.max_tokens);
        request.top_p = Some(self.settings.top_p);

        debug!(
            conversation = %id,
            provider = self.provider.name(),
            turns = request.messages.len(),
            "Sending completion request"
        );

        match self.provider.complete(request).await {
            Ok(response) => {
                let reply = response
                    .content
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| replies::EMPTY_COMPLETION.to_string());

                if let Some(usage) = &response.usage {
                    debug!(
                        conversation = %id,
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Completion usage"
                    );
                }

                self.store.append_assistant_turn(id, &reply);
                info!(conversation = %id, chars = reply.len(), "AI response ready");
                reply
            }
            Err(e) => {
                warn!(conversation = %id, error = %e, "Completion failed");
                error_reply(&e, self.provider.name())
            }
        }
    }
}

/// The user-facing string for a completion failure from `provider_name`.
pub fn error_reply(error: &ProviderError, provider_name: &str) -> String {
    match error {
        ProviderError::AuthenticationFailed(_) => replies::invalid_key(provider_name),
        ProviderError::RateLimited { .. } => replies::RATE_LIMITED.to_string(),
        ProviderError::ServerError { .. } => replies::service_issues(provider_name),
        _ => replies::TECHNICAL_ISSUE.to_string(),
    }
}
