//! Context window types for Parlo.
//!
//! A `ContextWindow` is the finalized role/content entry list sent to a
//! language model for one completion. It is transient and never persisted:
//! the context manager rebuilds it from the message log on every request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::llm::MessageRole;

/// One role/content entry in a context window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: MessageRole,
    pub content: String,
}

/// The assembled model-facing context for a single completion.
///
/// Entries are chronologically ordered: an optional summary entry covering
/// older messages, followed by the recent raw messages. The system prompt is
/// carried separately from the entry list (Anthropic API convention).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWindow {
    pub chat_id: Uuid,
    pub system_prompt: String,
    pub entries: Vec<ContextEntry>,
}

impl ContextWindow {
    /// Total character count across all entries (rough size indicator for logs).
    pub fn content_chars(&self) -> usize {
        self.entries.iter().map(|e| e.content.len()).sum()
    }
}

/// Which provider handles summarization calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStrategy {
    /// Delegate to the currently active chat provider/model.
    Same,
    /// Delegate to a designated secondary/offline provider.
    Local,
}

impl fmt::Display for SummaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStrategy::Same => write!(f, "same"),
            SummaryStrategy::Local => write!(f, "local"),
        }
    }
}

impl FromStr for SummaryStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "same" => Ok(SummaryStrategy::Same),
            "local" => Ok(SummaryStrategy::Local),
            other => Err(format!("invalid summary strategy: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_strategy_roundtrip() {
        for strategy in [SummaryStrategy::Same, SummaryStrategy::Local] {
            let s = strategy.to_string();
            let parsed: SummaryStrategy = s.parse().unwrap();
            assert_eq!(strategy, parsed);
        }
    }

    #[test]
    fn test_summary_strategy_serde() {
        let json = serde_json::to_string(&SummaryStrategy::Local).unwrap();
        assert_eq!(json, "\"local\"");
    }

    #[test]
    fn test_content_chars() {
        let window = ContextWindow {
            chat_id: Uuid::now_v7(),
            system_prompt: "You are a tutor.".to_string(),
            entries: vec![
                ContextEntry {
                    role: MessageRole::User,
                    content: "Hola".to_string(),
                },
                ContextEntry {
                    role: MessageRole::Assistant,
                    content: "¡Hola! ¿Qué tal?".to_string(),
                },
            ],
        };
        assert_eq!(window.content_chars(), 4 + "¡Hola! ¿Qué tal?".len());
    }
}
