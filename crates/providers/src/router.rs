//! Provider selection: builds the completion client named in config.

use std::sync::Arc;
use std::time::Duration;

use atlas_core::error::ProviderError;
use atlas_core::provider::Provider;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// The API key is taken as-is; callers that require one check
/// `AppConfig::require_api_key` first.
pub fn build_from_config(
    config: &atlas_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = &config.provider.name;
    let base_url = config.provider.base_url().ok_or_else(|| {
        ProviderError::NotConfigured(format!("unknown provider '{name}'; set provider.api_url"))
    })?;
    let api_key = config.api_key.clone().unwrap_or_default();

    let provider = OpenAiCompatProvider::with_timeout(
        name,
        base_url,
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )?;

    Ok(Arc::new(provider))
}
