//! Loopback channel: an in-process transport.
//!
//! Inbound messages are injected by the host program; outbound messages are
//! collected in an outbox. Connection drops and logouts can be simulated,
//! which makes this the transport for embedding Atlas and for tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use atlas_core::channel::{Channel, InboundMessage};
use atlas_core::error::ChannelError;
use atlas_core::message::ConversationId;
use tokio::sync::{Mutex, mpsc};
use tracing::info;

type InboundSender = mpsc::Sender<Result<InboundMessage, ChannelError>>;

pub struct LoopbackChannel {
    inject_tx: Mutex<Option<InboundSender>>,
    outbox: Mutex<Vec<(ConversationId, String)>>,
    fail_sends: AtomicBool,
    starts: AtomicU32,
    typing: Mutex<Vec<ConversationId>>,
}

impl LoopbackChannel {
    pub fn new() -> Self {
        Self {
            inject_tx: Mutex::new(None),
            outbox: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            starts: AtomicU32::new(0),
            typing: Mutex::new(Vec::new()),
        }
    }

    /// Deliver a message as if it came from the network.
    pub async fn inject(&self, msg: InboundMessage) -> Result<(), ChannelError> {
        self.push(Ok(msg)).await
    }

    /// Drop the current session with a recoverable error.
    pub async fn disconnect(&self, reason: &str) -> Result<(), ChannelError> {
        self.push(Err(ChannelError::ConnectionLost(reason.into()))).await?;
        *self.inject_tx.lock().await = None;
        Ok(())
    }

    /// End the current session with a logout, which is terminal.
    pub async fn logout(&self) -> Result<(), ChannelError> {
        self.push(Err(ChannelError::LoggedOut("session logged out".into()))).await?;
        *self.inject_tx.lock().await = None;
        Ok(())
    }

    /// Close the current session cleanly.
    pub async fn close(&self) {
        *self.inject_tx.lock().await = None;
    }

    /// Make every subsequent `send` fail (or succeed again).
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Everything sent so far, in order.
    pub async fn sent(&self) -> Vec<(ConversationId, String)> {
        self.outbox.lock().await.clone()
    }

    /// Conversations that were shown a typing indicator, in order.
    pub async fn typing(&self) -> Vec<ConversationId> {
        self.typing.lock().await.clone()
    }

    /// Number of times `start` has been called.
    pub fn start_count(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub async fn is_connected(&self) -> bool {
        self.inject_tx.lock().await.is_some()
    }

    async fn push(&self, item: Result<InboundMessage, ChannelError>) -> Result<(), ChannelError> {
        let guard = self.inject_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => tx
                .send(item)
                .await
                .map_err(|_| ChannelError::ConnectionLost("Message channel closed".into())),
            None => Err(ChannelError::ConnectionLost("Channel not started".into())),
        }
    }
}

impl Default for LoopbackChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    fn name(&self) -> &str {
        "loopback"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<InboundMessage, ChannelError>>, ChannelError> {
        let (tx, rx) = mpsc::channel(64);
        *self.inject_tx.lock().await = Some(tx);
        let n = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(start = n, "Loopback channel started");
        Ok(rx)
    }

    async fn send(
        &self,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<(), ChannelError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ChannelError::DeliveryFailed {
                chat_id: conversation_id.to_string(),
                reason: "loopback configured to fail".into(),
            });
        }
        self.outbox
            .lock()
            .await
            .push((conversation_id.clone(), content.to_string()));
        Ok(())
    }

    async fn send_typing(&self, conversation_id: &ConversationId) -> Result<(), ChannelError> {
        self.typing.lock().await.push(conversation_id.clone());
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        info!("Loopback channel stopping");
        self.close().await;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(self.is_connected().await)
    }
}
