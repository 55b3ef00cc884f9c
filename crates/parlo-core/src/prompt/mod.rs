//! System prompt builder for Parlo tutoring chats.
//!
//! Assembles the system prompt from the chat's topic, target language, and
//! CEFR level, using XML tag boundaries for clear section delineation.

use parlo_types::chat::{CefrLevel, TopicType};

/// Builds a tutoring system prompt from chat configuration.
///
/// Layout:
/// ```text
/// <role>language tutor persona for the target language</role>
/// <topic>what the conversation is about</topic>
/// <level>CEFR-calibrated language guidance</level>
/// <instructions>behavioral guidelines</instructions>
/// ```
pub struct SystemPromptBuilder;

impl SystemPromptBuilder {
    /// Build the complete system prompt for a chat.
    pub fn build(
        topic_type: TopicType,
        topic_key: Option<&str>,
        topic_details: Option<&str>,
        language: &str,
        level: CefrLevel,
    ) -> String {
        let mut sections = Vec::with_capacity(4);

        sections.push(format!(
            "<role>\nYou are a friendly, patient language tutor helping a learner practice {language} through conversation. Reply in {language}.\n</role>"
        ));

        let topic_line = match (topic_type, topic_key, topic_details) {
            (TopicType::Scenario, Some(key), _) => {
                format!("Role-play this scenario with the learner: {key}.")
            }
            (TopicType::Vocabulary, Some(key), _) => {
                format!("Steer the conversation to practice the vocabulary set: {key}.")
            }
            (_, _, Some(details)) => format!("The learner wants to talk about: {details}."),
            _ => "Let the learner steer the conversation freely.".to_string(),
        };
        sections.push(format!("<topic>\n{topic_line}\n</topic>"));

        sections.push(format!(
            "<level>\nThe learner is at CEFR level {}. {}\n</level>",
            level.to_string().to_uppercase(),
            level_guidance(level)
        ));

        sections.push(
            "<instructions>\n\
            Keep your turns short so the learner speaks more than you do.\n\
            Gently correct significant mistakes, then continue the conversation.\n\
            Ask follow-up questions to keep the exchange going.\n\
            </instructions>"
                .to_string(),
        );

        sections.join("\n\n")
    }
}

/// Level-appropriate language guidance for the tutor persona.
fn level_guidance(level: CefrLevel) -> &'static str {
    match level {
        CefrLevel::A1 => {
            "Use very simple vocabulary and short sentences. Repeat key phrases often."
        }
        CefrLevel::A2 => "Use simple everyday vocabulary and common phrases.",
        CefrLevel::B1 => "Use everyday language; introduce occasional new vocabulary in context.",
        CefrLevel::B2 => "Speak naturally; challenge the learner with idiomatic expressions.",
        CefrLevel::C1 => "Speak as you would with a fluent adult; correct subtle errors.",
        CefrLevel::C2 => "Speak with full native complexity, including nuance and register.",
    }
}
