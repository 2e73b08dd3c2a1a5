//! Fixed reply texts and the renderers for menus, facts and stats.

use atlas_config::AppConfig;
use atlas_core::fact::Fact;
use atlas_memory::ActivitySummary;

pub const PING: &str = "🏓 Pong! Bot is active and ready! 🤖✨";
pub const CLEARED: &str = "✅ Conversation history cleared! 🔄";
pub const NO_STATS: &str = "▸ No statistics available yet. Keep chatting!";
pub const JOKE_UNAVAILABLE: &str = "▸ Couldn't fetch a joke right now. 😅";
pub const HANDLER_ERROR: &str = "⚠️ I encountered an error. Please try again!";

pub const RATE_LIMITED: &str = "⏸️ Rate limit reached. Please wait and try again.";
pub const TECHNICAL_ISSUE: &str = "⚠️ I encountered a technical issue. Please try again.";
pub const EMPTY_COMPLETION: &str = "I understand your message. How can I help?";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━";

pub fn help(config: &AppConfig) -> String {
    format!(
        "╔════════════════════════════════╗\n\
         ║    📋 {name} v{version}    ║\n\
         ╚════════════════════════════════╝\n\
         \n\
         🤖 INTELLIGENT AI ASSISTANT\n\
         {RULE}\n\
         \n\
         🔹 Special Commands:\n\
         {RULE}\n\
         ▸ /help - Show this menu\n\
         ▸ /info - About this bot\n\
         ▸ /joke - Get a random dad joke\n\
         ▸ /quote - Get inspirational quote\n\
         ▸ /stats - Your chat statistics\n\
         ▸ /clear - Clear conversation history\n\
         ▸ /ping - Check bot status\n\
         \n\
         💡 Smart Features:\n\
         {RULE}\n\
         ✓ Natural conversation with AI\n\
         ✓ Remembers conversation context\n\
         ✓ Answers questions intelligently\n\
         ✓ Professional & friendly responses\n\
         \n\
         💬 Just chat naturally - I'll understand!",
        name = config.bot_name,
        version = config.version,
    )
}

pub fn info(config: &AppConfig) -> String {
    format!(
        "╔════════════════════════════════╗\n\
         ║      🤖 BOT INFORMATION       ║\n\
         ╚════════════════════════════════╝\n\
         \n\
         📱 Name: {name}\n\
         🔢 Version: {version}\n\
         ⚡ Status: Active & Learning\n\
         🧠 AI Model: {model}\n\
         🛠️ Built with: Rust + {provider} API\n\
         \n\
         {RULE}\n\
         AI-Powered Features:\n\
         ✓ Intelligent conversation\n\
         ✓ Context-aware responses\n\
         ✓ Natural language understanding\n\
         ✓ Multi-topic expertise",
        name = config.bot_name,
        version = config.version,
        model = config.provider.model,
        provider = provider_label(&config.provider.name),
    )
}

/// Reply for a rejected API key, naming the variable the key is read from.
pub fn invalid_key(provider_name: &str) -> String {
    let var = match provider_name {
        "groq" => "GROQ_API_KEY",
        _ => "ATLAS_API_KEY",
    };
    format!("⚠️ Invalid API key. Please check your {var} in the .env file.")
}

/// Reply for a provider-side (5xx) failure.
pub fn service_issues(provider_name: &str) -> String {
    format!(
        "⚠️ {} API is experiencing issues. Please try again shortly.",
        provider_label(provider_name)
    )
}

fn provider_label(name: &str) -> String {
    match name {
        "groq" => "Groq".into(),
        "openai" => "OpenAI".into(),
        "ollama" => "Ollama".into(),
        other => other.to_string(),
    }
}

pub fn joke(fact: &Fact) -> String {
    format!("🎭 DAD JOKE TIME!\n\n{}\n\n😄", fact.text)
}

pub fn quote(fact: &Fact) -> String {
    let author = fact.author.as_deref().unwrap_or("Unknown");
    format!("✨ INSPIRATIONAL QUOTE\n\n\"{}\"\n\n— {author}", fact.text)
}

pub fn stats(summary: Option<&ActivitySummary>) -> String {
    let Some(s) = summary else {
        return NO_STATS.to_string();
    };

    format!(
        "╔════════════════════════════════╗\n\
         ║     📊 YOUR CHAT STATS        ║\n\
         ╚════════════════════════════════╝\n\
         \n\
         💬 Total Messages: {messages}\n\
         🤖 AI Queries: {queries}\n\
         📅 First Interaction: {first}\n\
         🕐 Last Activity: {last}\n\
         ⏱️ Days Active: {days} days\n\
         \n\
         Keep chatting to increase your stats! 🚀",
        messages = s.message_count,
        queries = s.ai_query_count,
        first = s.first_seen.format("%Y-%m-%d"),
        last = s.last_seen.format("%Y-%m-%d %H:%M:%S UTC"),
        days = s.days_active,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn help_carries_name_and_version() {
        let text = help(&AppConfig::default());
        assert!(text.contains("📋 Atlas AI v1.0.0"));
        assert!(text.contains("▸ /clear - Clear conversation history"));
    }

    #[test]
    fn info_carries_model() {
        let text = info(&AppConfig::default());
        assert!(text.contains("🧠 AI Model: llama-3.3-70b-versatile"));
        assert!(text.contains("Built with: Rust + Groq API"));
    }

    #[test]
    fn error_replies_follow_provider() {
        assert_eq!(
            invalid_key("groq"),
            "⚠️ Invalid API key. Please check your GROQ_API_KEY in the .env file."
        );
        assert!(invalid_key("openai").contains("ATLAS_API_KEY"));
        assert_eq!(
            service_issues("groq"),
            "⚠️ Groq API is experiencing issues. Please try again shortly."
        );
        assert!(service_issues("openai").starts_with("⚠️ OpenAI API"));
        assert!(service_issues("local").starts_with("⚠️ local API"));
    }

    #[test]
    fn fact_rendering() {
        assert_eq!(
            joke(&Fact::new("Why?")),
            "🎭 DAD JOKE TIME!\n\nWhy?\n\n😄"
        );
        assert_eq!(
            quote(&Fact::attributed("Stay hungry, stay foolish.", "Steve Jobs")),
            "✨ INSPIRATIONAL QUOTE\n\n\"Stay hungry, stay foolish.\"\n\n— Steve Jobs"
        );
    }

    #[test]
    fn stats_rendering() {
        assert_eq!(stats(None), NO_STATS);

        let first = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let summary = ActivitySummary {
            message_count: 12,
            ai_query_count: 7,
            first_seen: first,
            last_seen: Utc.with_ymd_and_hms(2026, 3, 4, 18, 30, 5).unwrap(),
            days_active: 3,
        };
        let text = stats(Some(&summary));
        assert!(text.contains("💬 Total Messages: 12"));
        assert!(text.contains("🤖 AI Queries: 7"));
        assert!(text.contains("📅 First Interaction: 2026-03-01"));
        assert!(text.contains("🕐 Last Activity: 2026-03-04 18:30:05 UTC"));
        assert!(text.contains("⏱️ Days Active: 3 days"));
    }
}
