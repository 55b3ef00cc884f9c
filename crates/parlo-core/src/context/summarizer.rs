//! Thread summarizer for context window management.
//!
//! `ThreadSummarizer` condenses a contiguous run of older conversation
//! messages into a concise summary so the context manager can replace them
//! with a single entry. When a previous summary exists it is folded into the
//! prompt, so the output is always the merged summary of everything covered
//! so far.

use std::sync::Arc;
use std::time::Duration;

use parlo_observe::genai_attrs;
use parlo_types::chat::ChatMessage;
use parlo_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use crate::llm::box_provider::BoxLlmProvider;

/// System prompt for the summarization LLM call.
const SUMMARY_SYSTEM_PROMPT: &str = r#"Summarize the following language-practice conversation segment concisely. Preserve:
1. Vocabulary and grammar points that were practiced or corrected
2. Facts the learner shared about themselves
3. The current topic and where the conversation left off
4. Any unresolved questions

Keep the summary under 300 words. Write in third person (e.g., "The learner asked about..." "The tutor corrected...")."#;

/// The provider/model pair that handles summarization calls.
///
/// Resolved by the caller from the configured strategy (`same` reuses the
/// active chat backend, `local` uses the designated secondary provider) and
/// threaded into the context manager; the summarizer never picks a backend
/// itself.
#[derive(Clone)]
pub struct SummaryBackend {
    pub provider: Arc<BoxLlmProvider>,
    pub model: String,
}

/// Stateless utility for summarizing a run of chat messages.
pub struct ThreadSummarizer;

impl ThreadSummarizer {
    /// Summarize messages, merging them with any previous summary text.
    ///
    /// Identical inputs may legitimately yield different wording across
    /// calls; callers must compare covered ranges, never summary text.
    ///
    /// The provider call is bounded by `timeout`; an elapsed timeout
    /// surfaces as [`LlmError::Timeout`].
    #[tracing::instrument(
        name = "summarize_thread",
        skip(backend, previous_summary, messages),
        fields(
            model = %backend.model,
            message_count = messages.len(),
            has_previous = previous_summary.is_some(),
        )
    )]
    pub async fn summarize(
        backend: &SummaryBackend,
        previous_summary: Option<&str>,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, LlmError> {
        if messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "no messages to summarize".to_string(),
            ));
        }

        let conversation_text: String = messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let content = match previous_summary {
            Some(previous) => format!(
                "Here is the summary of the conversation so far:\n\n<previous_summary>\n{previous}\n</previous_summary>\n\nExtend it with this new segment, producing one merged summary:\n\n<conversation>\n{conversation_text}\n</conversation>"
            ),
            None => format!(
                "Please summarize this conversation:\n\n<conversation>\n{conversation_text}\n</conversation>"
            ),
        };

        let request = CompletionRequest {
            model: backend.model.clone(),
            messages: vec![Message {
                role: MessageRole::User,
                content,
            }],
            system: Some(SUMMARY_SYSTEM_PROMPT.to_string()),
            max_tokens: 1024,
            temperature: Some(0.0),
            stop_sequences: None,
        };

        let response = tokio::time::timeout(timeout, backend.provider.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(timeout.as_secs()))??;

        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::Provider {
                message: "provider returned an empty summary".to_string(),
            });
        }

        tracing::debug!(
            operation = genai_attrs::OP_SUMMARIZE_CONTEXT,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            summary_chars = text.len(),
            "summarization finished"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmProvider;
    use chrono::Utc;
    use parlo_types::llm::{
        CompletionRequest, CompletionResponse, ProviderCapabilities, StopReason, Usage,
    };
    use std::future::Future;
    use uuid::Uuid;

    struct EchoProvider {
        reply: String,
        capabilities: ProviderCapabilities,
    }

    impl EchoProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                capabilities: ProviderCapabilities {
                    max_context_tokens: 200_000,
                    max_output_tokens: 8_192,
                },
            }
        }
    }

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            let reply = self.reply.clone();
            async move {
                Ok(CompletionResponse {
                    id: "resp-1".to_string(),
                    content: reply,
                    model: "echo-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                })
            }
        }
    }

    fn backend(reply: &str) -> SummaryBackend {
        SummaryBackend {
            provider: Arc::new(BoxLlmProvider::new(EchoProvider::new(reply))),
            model: "echo-model".to_string(),
        }
    }

    fn message(seq: u64, role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            thread_id: None,
            role,
            content: content.to_string(),
            seq,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_summarize_returns_trimmed_text() {
        let messages = vec![
            message(1, MessageRole::User, "Hola, quiero practicar."),
            message(2, MessageRole::Assistant, "¡Claro! Empecemos."),
        ];
        let text = ThreadSummarizer::summarize(
            &backend("  The learner greeted the tutor.  "),
            None,
            &messages,
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(text, "The learner greeted the tutor.");
    }

    #[tokio::test]
    async fn test_summarize_empty_messages_rejected() {
        let err = ThreadSummarizer::summarize(
            &backend("whatever"),
            None,
            &[],
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_summarize_empty_output_rejected() {
        let messages = vec![message(1, MessageRole::User, "Hola")];
        let err = ThreadSummarizer::summarize(
            &backend("   "),
            None,
            &messages,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. }));
    }

    #[test]
    fn test_summary_system_prompt_instructions() {
        assert!(SUMMARY_SYSTEM_PROMPT.contains("Vocabulary and grammar"));
        assert!(SUMMARY_SYSTEM_PROMPT.contains("third person"));
        assert!(SUMMARY_SYSTEM_PROMPT.contains("300 words"));
    }
}
