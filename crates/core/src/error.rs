//! Error types for the Atlas domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error enum.

use thiserror::Error;

/// Failures of the completion API, categorized so the pipeline can map each
/// category to its own user-facing string.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by provider (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider server error: {message} (status: {status_code})")]
    ServerError { status_code: u16, message: String },

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status into a provider error.
    pub fn from_status(status_code: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status_code {
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            429 => ProviderError::RateLimited {
                retry_after_secs: None,
            },
            500..=599 => ProviderError::ServerError {
                status_code,
                message,
            },
            _ => ProviderError::ApiError {
                status_code,
                message,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Message delivery failed to {chat_id}: {reason}")]
    DeliveryFailed { chat_id: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    /// The session was explicitly logged out; re-authentication is required.
    #[error("Logged out: {0}")]
    LoggedOut(String),

    #[error("Reconnect attempts exhausted after {attempts} tries")]
    ReconnectExhausted { attempts: u32 },
}

impl ChannelError {
    /// Whether the supervisor may try to start the channel again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ChannelError::ConnectionLost(_))
    }
}

#[derive(Debug, Error)]
pub enum FactError {
    #[error("Fact request failed: {0}")]
    Network(String),

    #[error("Fact source returned status {0}")]
    Status(u16),

    #[error("Unexpected fact payload: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 418,
            message: "I'm a teapot".into(),
        };
        assert!(err.to_string().contains("418"));
        assert!(err.to_string().contains("teapot"));
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            ProviderError::from_status(401, ""),
            ProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ProviderError::from_status(403, ""),
            ProviderError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, "slow down"),
            ProviderError::RateLimited { .. }
        ));
        assert!(matches!(
            ProviderError::from_status(500, "boom"),
            ProviderError::ServerError { status_code: 500, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(503, "busy"),
            ProviderError::ServerError { status_code: 503, .. }
        ));
        assert!(matches!(
            ProviderError::from_status(400, "bad"),
            ProviderError::ApiError { status_code: 400, .. }
        ));
    }

    #[test]
    fn logout_is_not_recoverable() {
        assert!(ChannelError::ConnectionLost("reset".into()).is_recoverable());
        assert!(!ChannelError::LoggedOut("device removed".into()).is_recoverable());
        assert!(!ChannelError::ReconnectExhausted { attempts: 5 }.is_recoverable());
    }
}
