//! Channel trait: the abstraction over the messaging transport.
//!
//! A Channel owns the session with a messaging network. It emits inbound
//! messages and accepts outbound text for a conversation. Handshake, pairing
//! and credential storage are the implementation's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::message::ConversationId;

/// A message received from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// The conversation this message belongs to (reply target)
    pub conversation_id: ConversationId,

    /// The text body (caption text for media messages)
    pub content: String,

    /// Sent by this bot's own account
    #[serde(default)]
    pub from_self: bool,

    /// Originates from a broadcast list or status feed
    #[serde(default)]
    pub is_broadcast: bool,
}

impl InboundMessage {
    /// A plain text message from a counterpart.
    pub fn text(conversation_id: impl Into<ConversationId>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            from_self: false,
            is_broadcast: false,
        }
    }

    /// Whether this message should reach the router at all.
    ///
    /// Self-originated, broadcast and whitespace-only messages are dropped.
    pub fn is_routable(&self) -> bool {
        !self.from_self && !self.is_broadcast && !self.content.trim().is_empty()
    }
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli", "loopback").
    fn name(&self) -> &str;

    /// Open the session and start listening for incoming messages.
    ///
    /// The receiver closes when the session ends. A `ConnectionLost` item
    /// asks the supervisor to reconnect; `LoggedOut` is terminal.
    async fn start(
        &self,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<InboundMessage, ChannelError>>, ChannelError>;

    /// Send a text message to a conversation.
    async fn send(
        &self,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<(), ChannelError>;

    /// Send a typing indicator (if the platform supports it).
    async fn send_typing(&self, _conversation_id: &ConversationId) -> Result<(), ChannelError> {
        Ok(()) // No-op default
    }

    /// Close the session gracefully.
    async fn stop(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    /// Health check: is the session open?
    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_routable() {
        let msg = InboundMessage::text("alice", "Hello bot!");
        assert_eq!(msg.conversation_id.as_str(), "alice");
        assert!(msg.is_routable());
    }

    #[test]
    fn filtered_messages() {
        let mut own = InboundMessage::text("alice", "echo");
        own.from_self = true;
        assert!(!own.is_routable());

        let mut status = InboundMessage::text("status@broadcast", "story");
        status.is_broadcast = true;
        assert!(!status.is_routable());

        assert!(!InboundMessage::text("alice", "   \n\t").is_routable());
    }
}
