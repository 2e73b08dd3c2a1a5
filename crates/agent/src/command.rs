//! Command parsing: a pure classification of an inbound text body.

/// What an inbound message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Info,
    Ping,
    Joke,
    Quote,
    Stats,
    Clear,
    /// Anything that is not exactly one of the commands above.
    /// Carries the original body, untrimmed.
    Freeform(String),
}

impl Command {
    /// Classify `text`. The whole body, trimmed and lowercased, must equal a
    /// command keyword; `/help me` or `/helpme` are freeform.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "/help" => Command::Help,
            "/info" => Command::Info,
            "/ping" => Command::Ping,
            "/joke" => Command::Joke,
            "/quote" => Command::Quote,
            "/stats" => Command::Stats,
            "/clear" => Command::Clear,
            _ => Command::Freeform(text.to_string()),
        }
    }

    /// The keyword for logs; `None` for freeform text.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Command::Help => Some("/help"),
            Command::Info => Some("/info"),
            Command::Ping => Some("/ping"),
            Command::Joke => Some("/joke"),
            Command::Quote => Some("/quote"),
            Command::Stats => Some("/stats"),
            Command::Clear => Some("/clear"),
            Command::Freeform(_) => None,
        }
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self, Command::Freeform(_))
    }
}
