//! Per-message handling between a channel and the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use atlas_channels::InboundHandler;
use atlas_core::channel::{Channel, InboundMessage};
use tracing::{debug, error, info};

use crate::command::Command;
use crate::dispatcher::Dispatcher;
use crate::message_log::{Direction, MessageLog, preview};
use crate::replies;

/// Filters, logs and dispatches inbound messages, then sends the reply.
///
/// Every message is handled to completion before the next one is read.
/// A failed reply triggers one apology send; if that fails too, it is
/// logged and dropped.
pub struct MessageRunner {
    dispatcher: Arc<Dispatcher>,
    log: Option<Arc<MessageLog>>,
}

impl MessageRunner {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            log: None,
        }
    }

    pub fn with_log(mut self, log: Arc<MessageLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    fn record(&self, direction: Direction, from: &str, body: &str) {
        if let Some(log) = &self.log {
            log.record(direction, from, body);
        }
    }
}

#[async_trait]
impl InboundHandler for MessageRunner {
    async fn on_message(&self, channel: &dyn Channel, msg: InboundMessage) {
        if !msg.is_routable() {
            debug!(
                conversation = %msg.conversation_id,
                from_self = msg.from_self,
                broadcast = msg.is_broadcast,
                "Ignoring message"
            );
            return;
        }

        let id = &msg.conversation_id;
        info!(conversation = %id, text = %preview(&msg.content), "Message received");
        self.record(Direction::Received, id.as_str(), &msg.content);

        if Command::parse(&msg.content).is_freeform() {
            if let Err(e) = channel.send_typing(id).await {
                debug!(conversation = %id, error = %e, "Typing indicator failed");
            }
        }

        let reply = self.dispatcher.handle(id, &msg.content).await;

        match channel.send(id, &reply).await {
            Ok(()) => {
                info!(conversation = %id, reply = %preview(&reply), "Reply sent");
                self.record(Direction::Sent, id.as_str(), &reply);
            }
            Err(e) => {
                error!(conversation = %id, error = %e, "Error handling message");
                if let Err(e) = channel.send(id, replies::HANDLER_ERROR).await {
                    error!(conversation = %id, error = %e, "Failed to send error message");
                }
            }
        }
    }
}
