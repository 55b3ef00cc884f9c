//! Chat, message, and thread summary types for Parlo.
//!
//! These types model tutoring conversations between a learner and the
//! assistant: the chat itself (topic, language, CEFR level), its append-only
//! message log, and summaries of older message runs produced by the context
//! manager when a conversation outgrows its budget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// What kind of conversation a chat is.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (topic_type IN ('free_talk', 'scenario', 'vocabulary'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicType {
    /// Open-ended conversation practice.
    FreeTalk,
    /// Role-play of a concrete situation (restaurant, airport, ...).
    Scenario,
    /// Conversation built around a vocabulary set.
    Vocabulary,
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicType::FreeTalk => write!(f, "free_talk"),
            TopicType::Scenario => write!(f, "scenario"),
            TopicType::Vocabulary => write!(f, "vocabulary"),
        }
    }
}

impl FromStr for TopicType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free_talk" => Ok(TopicType::FreeTalk),
            "scenario" => Ok(TopicType::Scenario),
            "vocabulary" => Ok(TopicType::Vocabulary),
            other => Err(format!("invalid topic type: '{other}'")),
        }
    }
}

/// CEFR proficiency level of the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CefrLevel::A1 => write!(f, "a1"),
            CefrLevel::A2 => write!(f, "a2"),
            CefrLevel::B1 => write!(f, "b1"),
            CefrLevel::B2 => write!(f, "b2"),
            CefrLevel::C1 => write!(f, "c1"),
            CefrLevel::C2 => write!(f, "c2"),
        }
    }
}

impl FromStr for CefrLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a1" => Ok(CefrLevel::A1),
            "a2" => Ok(CefrLevel::A2),
            "b1" => Ok(CefrLevel::B1),
            "b2" => Ok(CefrLevel::B2),
            "c1" => Ok(CefrLevel::C1),
            "c2" => Ok(CefrLevel::C2),
            other => Err(format!("invalid CEFR level: '{other}'")),
        }
    }
}

/// A tutoring conversation between a learner and the assistant.
///
/// Chats carry the topic and learner configuration used to render the system
/// prompt. A chat may reference a `thread_id` when it was forked from a
/// shared message history root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub topic_type: TopicType,
    /// Key of a predefined topic (e.g. a scenario slug), if any.
    pub topic_key: Option<String>,
    /// Free-form detail text for custom topics.
    pub topic_details: Option<String>,
    /// Target language being practiced (e.g. "es", "fr").
    pub language: String,
    pub level: CefrLevel,
    /// Set when this chat is a fork of a shared history root.
    pub thread_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A single message within a chat.
///
/// Messages are immutable and append-only. `seq` is assigned by the store on
/// append and is strictly increasing and unique within a (chat, thread); all
/// ordering and summary-coverage logic works on `seq`, never on timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    /// `None` for the main thread.
    pub thread_id: Option<Uuid>,
    pub role: MessageRole,
    pub content: String,
    /// Position in the append order, starting at 1.
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

/// A summary of a contiguous run of older messages within a chat thread.
///
/// Thread summaries are append-only: a new summary supersedes an older one
/// by covering a strictly longer range, never by mutation. The covered range
/// `[start_seq, end_seq]` is always a prefix of the thread's sequence, so the
/// entry with the maximal `end_seq` is the active summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub thread_id: Option<Uuid>,
    /// First message seq covered by this summary.
    pub start_seq: u64,
    /// Last message seq covered by this summary.
    pub end_seq: u64,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl ThreadSummary {
    /// Whether this summary covers the message with the given seq.
    pub fn covers(&self, seq: u64) -> bool {
        self.start_seq <= seq && seq <= self.end_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_type_roundtrip() {
        for ty in [TopicType::FreeTalk, TopicType::Scenario, TopicType::Vocabulary] {
            let s = ty.to_string();
            let parsed: TopicType = s.parse().unwrap();
            assert_eq!(ty, parsed);
        }
    }

    #[test]
    fn test_topic_type_serde() {
        let json = serde_json::to_string(&TopicType::FreeTalk).unwrap();
        assert_eq!(json, "\"free_talk\"");
        let parsed: TopicType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TopicType::FreeTalk);
    }

    #[test]
    fn test_cefr_level_ordering() {
        assert!(CefrLevel::A1 < CefrLevel::B1);
        assert!(CefrLevel::B2 < CefrLevel::C2);
    }

    #[test]
    fn test_cefr_level_roundtrip() {
        for level in [
            CefrLevel::A1,
            CefrLevel::A2,
            CefrLevel::B1,
            CefrLevel::B2,
            CefrLevel::C1,
            CefrLevel::C2,
        ] {
            let s = level.to_string();
            let parsed: CefrLevel = s.parse().unwrap();
            assert_eq!(level, parsed);
        }
    }

    #[test]
    fn test_thread_summary_covers() {
        let summary = ThreadSummary {
            id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            thread_id: None,
            start_seq: 1,
            end_seq: 10,
            summary: "The learner ordered coffee in Spanish.".to_string(),
            created_at: Utc::now(),
        };
        assert!(summary.covers(1));
        assert!(summary.covers(10));
        assert!(!summary.covers(11));
    }

    #[test]
    fn test_chat_serialize() {
        let chat = Chat {
            id: Uuid::now_v7(),
            topic_type: TopicType::Scenario,
            topic_key: Some("restaurant".to_string()),
            topic_details: None,
            language: "es".to_string(),
            level: CefrLevel::B1,
            thread_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&chat).unwrap();
        assert!(json.contains("\"topic_type\":\"scenario\""));
        assert!(json.contains("\"level\":\"b1\""));
    }
}
