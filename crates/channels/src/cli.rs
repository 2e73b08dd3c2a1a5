//! CLI channel: interactive terminal-based chat.
//!
//! Reads lines from stdin, writes replies to stdout. Every line belongs to
//! the single conversation `cli_session`.
//!
//! Stdin is read on a dedicated OS thread, never the runtime's blocking
//! pool, so a pending read cannot hold up runtime shutdown. `stop` ends the
//! session at once; the reader thread exits with the process.

use std::io::BufRead;

use async_trait::async_trait;
use atlas_core::channel::{Channel, InboundMessage};
use atlas_core::error::ChannelError;
use atlas_core::message::ConversationId;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::debug;

pub const CLI_CONVERSATION: &str = "cli_session";

type InboundItem = Result<InboundMessage, ChannelError>;

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel {
    prompt: String,
    input: Mutex<Option<Box<dyn BufRead + Send>>>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            prompt: "Atlas".into(),
            input: Mutex::new(None),
            stop_tx: Mutex::new(None),
        }
    }

    /// Label printed in front of each reply line.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Read from `reader` instead of stdin. The first `start` consumes it;
    /// later starts read stdin.
    pub fn with_input(mut self, reader: impl BufRead + Send + 'static) -> Self {
        self.input = Mutex::new(Some(Box::new(reader)));
        self
    }

    fn is_exit(line: &str) -> bool {
        matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward lines until EOF, an exit word, or the receiving side goes away.
fn read_lines<R: BufRead>(reader: R, tx: &mpsc::Sender<InboundItem>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if CliChannel::is_exit(line.trim()) {
                    break;
                }
                if tx
                    .blocking_send(Ok(InboundMessage::text(CLI_CONVERSATION, line)))
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.blocking_send(Err(ChannelError::ConnectionLost(e.to_string())));
                break;
            }
        }
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundItem>, ChannelError> {
        let (line_tx, mut line_rx) = mpsc::channel(32);
        let input = self.input.lock().await.take();

        std::thread::Builder::new()
            .name("atlas-stdin".into())
            .spawn(move || match input {
                Some(reader) => read_lines(reader, &line_tx),
                None => read_lines(std::io::stdin().lock(), &line_tx),
            })
            .map_err(|e| {
                ChannelError::ConnectionLost(format!("Failed to spawn stdin reader: {e}"))
            })?;

        let (tx, rx) = mpsc::channel(32);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        *self.stop_tx.lock().await = Some(stop_tx);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    item = line_rx.recv() => match item {
                        Some(item) => {
                            if tx.send(item).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        Ok(rx)
    }

    async fn send(
        &self,
        _conversation_id: &ConversationId,
        content: &str,
    ) -> Result<(), ChannelError> {
        println!();
        for line in content.lines() {
            println!("  {} > {line}", self.prompt);
        }
        println!();
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        if let Some(stop) = self.stop_tx.lock().await.take() {
            let _ = stop.send(());
        }
        debug!("CLI channel stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};
    use std::sync::mpsc as std_mpsc;
    use std::time::Duration;

    /// Input that blocks until a chunk is fed, like a terminal nobody types in.
    struct HeldOpen {
        chunks: std_mpsc::Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl Read for HeldOpen {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pending.is_empty() {
                match self.chunks.recv() {
                    Ok(chunk) => self.pending = chunk,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    fn held_open() -> (std_mpsc::Sender<Vec<u8>>, BufReader<HeldOpen>) {
        let (feed, chunks) = std_mpsc::channel();
        let input = HeldOpen {
            chunks,
            pending: Vec::new(),
        };
        (feed, BufReader::new(input))
    }

    #[test]
    fn exit_words() {
        assert!(CliChannel::is_exit("quit"));
        assert!(CliChannel::is_exit(":q"));
        assert!(!CliChannel::is_exit("/help"));
    }

    #[tokio::test]
    async fn lines_become_cli_messages() {
        let ch = CliChannel::new().with_input(Cursor::new("hello\n/ping\n"));
        assert_eq!(ch.name(), "cli");
        let mut rx = ch.start().await.unwrap();

        let first = rx.recv().await.unwrap().unwrap();
        assert_eq!(first.content, "hello");
        assert_eq!(first.conversation_id.as_str(), CLI_CONVERSATION);
        assert_eq!(rx.recv().await.unwrap().unwrap().content, "/ping");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn exit_word_ends_session() {
        let ch = CliChannel::new().with_input(Cursor::new("hi\n  quit \nignored\n"));
        let mut rx = ch.start().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().unwrap().content, "hi");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stop_ends_session_while_input_stays_open() {
        let (feed, input) = held_open();
        let ch = CliChannel::new().with_input(input);
        let mut rx = ch.start().await.unwrap();

        feed.send(b"hello\n".to_vec()).unwrap();
        assert_eq!(rx.recv().await.unwrap().unwrap().content, "hello");

        ch.stop().await.unwrap();
        let closed = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(closed, Ok(None)));

        // The reader thread is still parked on the open input.
        drop(feed);
    }

    #[tokio::test]
    async fn send_prints_without_error() {
        let ch = CliChannel::new().with_prompt("Nova");
        assert!(ch.send(&ConversationId::from(CLI_CONVERSATION), "hi\nthere").await.is_ok());
    }
}
