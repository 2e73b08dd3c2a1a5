//! Append-only text log of received and sent messages.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::warn;

/// Longest body shown in console previews before it is cut.
pub const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Received,
    Sent,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Received => write!(f, "RECEIVED"),
            Direction::Sent => write!(f, "SENT"),
        }
    }
}

pub struct MessageLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl MessageLog {
    /// Open (or create) the log. A header naming the bot is written when the
    /// file is new or empty.
    pub fn open(path: impl AsRef<Path>, bot_name: &str) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() == 0 {
            write!(
                file,
                "=== {bot_name} - MESSAGE LOG ===\nStarted: {}\n\n",
                timestamp()
            )?;
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Failures are logged and otherwise ignored.
    pub fn record(&self, direction: Direction, from: &str, body: &str) {
        let line = format!(
            "[{}] {direction} | From: {from} | Message: {body}\n",
            timestamp()
        );

        let result = match self.file.lock() {
            Ok(mut file) => file.write_all(line.as_bytes()),
            Err(poisoned) => poisoned.into_inner().write_all(line.as_bytes()),
        };

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to write message log");
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `text` cut to [`PREVIEW_CHARS`] characters, with `...` when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
