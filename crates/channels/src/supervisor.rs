//! Session supervisor: keeps a channel running with bounded reconnects.
//!
//! A recoverable failure (start error or `ConnectionLost` mid-session) is
//! followed by a fixed delay and another `start`. A `LoggedOut` error ends
//! the supervisor immediately. Every successful start resets the counter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use atlas_config::ReconnectConfig;
use atlas_core::channel::{Channel, InboundMessage};
use atlas_core::error::ChannelError;
use tracing::{error, info, warn};

/// Receives each inbound message the supervised channel produces.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn on_message(&self, channel: &dyn Channel, msg: InboundMessage);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_secs(config.delay_secs),
        }
    }
}

pub struct Supervisor {
    channel: Arc<dyn Channel>,
    policy: ReconnectPolicy,
}

impl Supervisor {
    pub fn new(channel: Arc<dyn Channel>, policy: ReconnectPolicy) -> Self {
        Self { channel, policy }
    }

    /// Run until the session ends.
    ///
    /// Returns `Ok(())` when the channel closes its stream cleanly,
    /// `LoggedOut` (or any other unrecoverable error) as-is, and
    /// `ReconnectExhausted` once the attempt budget is spent.
    pub async fn run(&self, handler: &dyn InboundHandler) -> Result<(), ChannelError> {
        let mut attempts: u32 = 0;

        loop {
            let failure = match self.channel.start().await {
                Ok(mut rx) => {
                    attempts = 0;
                    info!(channel = self.channel.name(), "Channel connected");

                    let mut lost = None;
                    while let Some(item) = rx.recv().await {
                        match item {
                            Ok(msg) => handler.on_message(self.channel.as_ref(), msg).await,
                            Err(e) if e.is_recoverable() => {
                                lost = Some(e);
                                break;
                            }
                            Err(e) => {
                                error!(
                                    channel = self.channel.name(),
                                    error = %e,
                                    "Channel closed permanently"
                                );
                                return Err(e);
                            }
                        }
                    }

                    match lost {
                        Some(e) => e,
                        None => {
                            info!(channel = self.channel.name(), "Channel session ended");
                            return Ok(());
                        }
                    }
                }
                Err(e) if e.is_recoverable() => e,
                Err(e) => {
                    error!(channel = self.channel.name(), error = %e, "Channel failed to start");
                    return Err(e);
                }
            };

            if attempts >= self.policy.max_attempts {
                error!(
                    channel = self.channel.name(),
                    attempts,
                    "Max reconnection attempts reached"
                );
                return Err(ChannelError::ReconnectExhausted { attempts });
            }
            attempts += 1;

            warn!(
                channel = self.channel.name(),
                error = %failure,
                attempt = attempts,
                max = self.policy.max_attempts,
                delay_secs = self.policy.delay.as_secs(),
                "Connection lost, reconnecting"
            );
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackChannel;
    use atlas_core::message::ConversationId;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::mpsc;

    /// Records message contents and echoes them back.
    struct EchoHandler {
        seen: Mutex<Vec<String>>,
    }

    impl EchoHandler {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InboundHandler for EchoHandler {
        async fn on_message(&self, channel: &dyn Channel, msg: InboundMessage) {
            self.seen.lock().unwrap().push(msg.content.clone());
            let _ = channel.send(&msg.conversation_id, &msg.content).await;
        }
    }

    /// A channel whose `start` fails with `ConnectionLost` every time.
    struct DeadChannel {
        starts: AtomicU32,
    }

    #[async_trait]
    impl Channel for DeadChannel {
        fn name(&self) -> &str {
            "dead"
        }
        async fn start(
            &self,
        ) -> Result<mpsc::Receiver<Result<InboundMessage, ChannelError>>, ChannelError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Err(ChannelError::ConnectionLost("refused".into()))
        }
        async fn send(&self, _: &ConversationId, _: &str) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }

    async fn wait_for_start(ch: &LoopbackChannel, n: u32) {
        while ch.start_count() < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn policy_from_config() {
        let config = ReconnectConfig {
            max_attempts: 3,
            delay_secs: 2,
        };
        let from_config = ReconnectPolicy::from(&config);
        assert_eq!(from_config.max_attempts, 3);
        assert_eq!(from_config.delay, Duration::from_secs(2));
        assert_eq!(ReconnectPolicy::default(), policy());
    }

    #[tokio::test(start_paused = true)]
    async fn clean_close_returns_ok() {
        let ch = Arc::new(LoopbackChannel::new());
        let supervisor = Supervisor::new(ch.clone(), policy());
        let handler = EchoHandler::new();

        let driver = async {
            wait_for_start(&ch, 1).await;
            ch.inject(InboundMessage::text("alice", "hi")).await.unwrap();
            ch.close().await;
        };

        let (result, ()) = tokio::join!(supervisor.run(&handler), driver);
        assert!(result.is_ok());
        assert_eq!(*handler.seen.lock().unwrap(), vec!["hi".to_string()]);
        assert_eq!(ch.sent().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_after_connection_lost() {
        let ch = Arc::new(LoopbackChannel::new());
        let supervisor = Supervisor::new(ch.clone(), policy());
        let handler = EchoHandler::new();

        let driver = async {
            wait_for_start(&ch, 1).await;
            ch.disconnect("stream errored").await.unwrap();
            wait_for_start(&ch, 2).await;
            ch.inject(InboundMessage::text("alice", "back")).await.unwrap();
            ch.close().await;
        };

        let (result, ()) = tokio::join!(supervisor.run(&handler), driver);
        assert!(result.is_ok());
        assert_eq!(ch.start_count(), 2);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["back".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_counter_resets_after_successful_start() {
        let ch = Arc::new(LoopbackChannel::new());
        let tight = ReconnectPolicy {
            max_attempts: 2,
            delay: Duration::from_secs(5),
        };
        let supervisor = Supervisor::new(ch.clone(), tight);
        let handler = EchoHandler::new();

        let driver = async {
            for n in 1..=6 {
                wait_for_start(&ch, n).await;
                ch.disconnect("stream errored").await.unwrap();
            }
            wait_for_start(&ch, 7).await;
            ch.inject(InboundMessage::text("alice", "still here")).await.unwrap();
            ch.close().await;
        };

        let (result, ()) = tokio::join!(supervisor.run(&handler), driver);
        assert!(result.is_ok());
        assert_eq!(ch.start_count(), 7);
        assert_eq!(*handler.seen.lock().unwrap(), vec!["still here".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_is_fatal() {
        let ch = Arc::new(LoopbackChannel::new());
        let supervisor = Supervisor::new(ch.clone(), policy());
        let handler = EchoHandler::new();

        let driver = async {
            wait_for_start(&ch, 1).await;
            ch.logout().await.unwrap();
        };

        let (result, ()) = tokio::join!(supervisor.run(&handler), driver);
        assert!(matches!(result, Err(ChannelError::LoggedOut(_))));
        assert_eq!(ch.start_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let ch = Arc::new(DeadChannel {
            starts: AtomicU32::new(0),
        });
        let supervisor = Supervisor::new(ch.clone(), policy());
        let handler = EchoHandler::new();

        let result = supervisor.run(&handler).await;
        assert!(matches!(
            result,
            Err(ChannelError::ReconnectExhausted { attempts: 5 })
        ));
        // the initial start plus five retries
        assert_eq!(ch.starts.load(Ordering::SeqCst), 6);
    }
}
