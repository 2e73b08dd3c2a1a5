//! Configuration loading, validation, and management for Atlas.
//!
//! Loads configuration from `~/.atlas/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.atlas/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name used in the persona, banners and command replies
    #[serde(default = "default_bot_name")]
    pub bot_name: String,

    /// Version shown by `/help` and `/info`
    #[serde(default = "default_version")]
    pub version: String,

    /// Completion API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Conversation history settings
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Transport reconnect policy
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Joke and quote endpoints
    #[serde(default)]
    pub facts: FactsConfig,

    /// Message log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_bot_name() -> String {
    "Atlas AI".into()
}
fn default_version() -> String {
    "1.0.0".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_name", &self.bot_name)
            .field("version", &self.version)
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("conversation", &self.conversation)
            .field("reconnect", &self.reconnect)
            .field("facts", &self.facts)
            .field("logging", &self.logging)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Well-known provider name ("groq", "openai", "openrouter", "ollama", ...)
    #[serde(default = "default_provider_name")]
    pub name: String,

    /// Base URL override; defaults per well-known provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum reply length in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// HTTP client timeout for completion calls
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "groq".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.95
}
fn default_provider_timeout() -> u64 {
    120
}

impl ProviderConfig {
    /// The endpoint to call: `api_url` if set, else the well-known default
    /// for `name`. `None` for an unknown name without an override.
    pub fn base_url(&self) -> Option<String> {
        self.api_url
            .clone()
            .or_else(|| well_known_base_url(&self.name).map(String::from))
    }
}

/// Default base URL for well-known OpenAI-compatible providers.
pub fn well_known_base_url(provider_name: &str) -> Option<&'static str> {
    let url = match provider_name {
        "groq" => "https://api.groq.com/openai/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Maximum stored turns per conversation (system prompt excluded)
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Replace the built-in persona entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_history_cap() -> usize {
    6
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

fn default_max_attempts() -> u32 {
    5
}
fn default_delay_secs() -> u64 {
    5
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsConfig {
    #[serde(default = "default_joke_url")]
    pub joke_url: String,

    #[serde(default = "default_quote_url")]
    pub quote_url: String,

    #[serde(default = "default_facts_timeout")]
    pub timeout_secs: u64,
}

fn default_joke_url() -> String {
    "https://icanhazdadjoke.com/".into()
}
fn default_quote_url() -> String {
    "https://zenquotes.io/api/random".into()
}
fn default_facts_timeout() -> u64 {
    10
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            joke_url: default_joke_url(),
            quote_url: default_quote_url(),
            timeout_secs: default_facts_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append-only log of inbound and outbound messages
    #[serde(default = "default_message_log")]
    pub message_log: PathBuf,
}

fn default_message_log() -> PathBuf {
    PathBuf::from("messages.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            message_log: default_message_log(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.atlas/config.toml).
    ///
    /// Environment variables override the file:
    /// - `ATLAS_API_KEY`, then `GROQ_API_KEY` (only if no key is in the file)
    /// - `ATLAS_PROVIDER`, `ATLAS_MODEL`, `ATLAS_LOG_FILE`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("ATLAS_API_KEY").or_else(|| lookup("GROQ_API_KEY"));
        }

        if let Some(provider) = lookup("ATLAS_PROVIDER") {
            self.provider.name = provider;
        }

        if let Some(model) = lookup("ATLAS_MODEL") {
            self.provider.model = model;
        }

        if let Some(log_file) = lookup("ATLAS_LOG_FILE") {
            self.logging.message_log = PathBuf::from(log_file);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".atlas")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.provider.top_p <= 0.0 || self.provider.top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "provider.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.provider.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "provider.max_tokens must be > 0".into(),
            ));
        }

        if self.provider.base_url().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "provider.name '{}' is not a known provider; set provider.api_url",
                self.provider.name
            )));
        }

        if self.conversation.history_cap == 0 {
            return Err(ConfigError::ValidationError(
                "conversation.history_cap must be >= 1".into(),
            ));
        }

        Ok(())
    }

    /// The API key, or the fatal startup error if none is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// The persona sent as the first turn of every completion request.
    pub fn system_prompt(&self) -> String {
        if let Some(prompt) = &self.conversation.system_prompt {
            return prompt.clone();
        }
        format!(
            "You are {}, a helpful and intelligent AI assistant.\n\
             - Provide clear, concise, and accurate responses\n\
             - Be conversational and natural\n\
             - Use emojis sparingly when appropriate\n\
             - If you don't know something, admit it honestly\n\
             - Keep responses under 200 words unless more detail is requested",
            self.bot_name
        )
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bot_name: default_bot_name(),
            version: default_version(),
            api_key: None,
            provider: ProviderConfig::default(),
            conversation: ConversationConfig::default(),
            reconnect: ReconnectConfig::default(),
            facts: FactsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No API key configured (set GROQ_API_KEY in .env or the environment)")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.bot_name, "Atlas AI");
        assert_eq!(config.provider.name, "groq");
        assert_eq!(config.provider.model, "llama-3.3-70b-versatile");
        assert_eq!(config.provider.max_tokens, 500);
        assert_eq!(config.conversation.history_cap, 6);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.model, config.provider.model);
        assert_eq!(parsed.logging.message_log, config.logging.message_log);
    }

    #[test]
    fn invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.provider.temperature = 5.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.conversation.history_cap = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.provider.top_p = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_needs_api_url() {
        let mut config = AppConfig::default();
        config.provider.name = "mystery".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mystery"));

        config.provider.api_url = Some("http://127.0.0.1:9999/v1".into());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.provider.base_url().as_deref(),
            Some("http://127.0.0.1:9999/v1")
        );
    }

    #[test]
    fn well_known_base_urls() {
        let mut provider = ProviderConfig::default();
        assert_eq!(
            provider.base_url().as_deref(),
            Some("https://api.groq.com/openai/v1")
        );
        provider.name = "ollama".into();
        assert!(provider.base_url().unwrap().contains("localhost:11434"));
        assert!(well_known_base_url("openai").unwrap().contains("api.openai.com"));
        assert!(well_known_base_url("mystery").is_none());
    }

    #[test]
    fn unknown_provider_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[provider]\nname = \"mystery\"").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider.name, "groq");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bot_name = "Nova"

[conversation]
history_cap = 10

[reconnect]
delay_secs = 1
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.bot_name, "Nova");
        assert_eq!(config.conversation.history_cap, 10);
        assert_eq!(config.reconnect.delay_secs, 1);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert!(config.system_prompt().starts_with("You are Nova,"));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bot_name = [unterminated").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides() {
        let mut config = AppConfig::default();
        config.apply_env(env_from(&[
            ("GROQ_API_KEY", "gsk_from_env"),
            ("ATLAS_MODEL", "llama-3.1-8b-instant"),
            ("ATLAS_LOG_FILE", "/var/log/atlas.log"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("gsk_from_env"));
        assert_eq!(config.provider.model, "llama-3.1-8b-instant");
        assert_eq!(config.logging.message_log, PathBuf::from("/var/log/atlas.log"));
    }

    #[test]
    fn atlas_key_wins_and_file_key_is_kept() {
        let mut config = AppConfig::default();
        config.apply_env(env_from(&[("ATLAS_API_KEY", "a"), ("GROQ_API_KEY", "g")]));
        assert_eq!(config.api_key.as_deref(), Some("a"));

        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(env_from(&[("GROQ_API_KEY", "g")]));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let config = AppConfig::default();
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingApiKey)));

        let config = AppConfig {
            api_key: Some("  ".into()),
            ..AppConfig::default()
        };
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let config = AppConfig {
            api_key: Some("gsk_secret".into()),
            ..AppConfig::default()
        };
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn system_prompt_override() {
        let mut config = AppConfig::default();
        assert!(config.system_prompt().contains("Atlas AI"));
        config.conversation.system_prompt = Some("Be terse.".into());
        assert_eq!(config.system_prompt(), "Be terse.");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("llama-3.3-70b-versatile"));
        assert!(toml_str.contains("history_cap = 6"));
    }
}
