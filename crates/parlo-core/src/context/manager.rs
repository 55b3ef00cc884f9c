//! Context manager: decides what the model sees for one completion.
//!
//! Per request, `build_context` assembles the ordered entry list submitted
//! to the model: the full history, a recent window plus older messages
//! verbatim, or a recent window plus a single summary entry covering the
//! older messages. Summarization is lazy (only on budget overflow),
//! idempotent over the persisted summary state, and never fatal: a failed
//! summarization degrades to verbatim history for that call.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parlo_types::chat::{ChatMessage, ThreadSummary};
use parlo_types::config::ContextConfig;
use parlo_types::context::{ContextEntry, ContextWindow};
use parlo_types::error::RepositoryError;
use parlo_types::llm::MessageRole;
use uuid::Uuid;

use crate::chat::repository::ChatRepository;

use super::summarizer::{SummaryBackend, ThreadSummarizer};

/// Errors from context construction.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("chat not found")]
    ChatNotFound,

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Builds the model-facing context window for a chat turn.
///
/// Constructed per request with the request's own configuration and an
/// already-resolved summarization backend (or `None` when no backend is
/// available, in which case overflowing history is sent verbatim).
pub struct ContextManager<R> {
    repo: Arc<R>,
    config: ContextConfig,
    summary_backend: Option<SummaryBackend>,
}

impl<R: ChatRepository> ContextManager<R> {
    pub fn new(
        repo: Arc<R>,
        config: ContextConfig,
        summary_backend: Option<SummaryBackend>,
    ) -> Self {
        Self {
            repo,
            config,
            summary_backend,
        }
    }

    /// Build the context window for one completion.
    ///
    /// Guarantees: entries are chronologically ordered; no message appears
    /// twice (verbatim or folded into the summary, never both); for a fixed
    /// message sequence and persisted summary state, repeated calls cover
    /// identical ranges and do not re-trigger summarization.
    #[tracing::instrument(
        name = "build_context",
        skip(self, system_prompt),
        fields(chat_id = %chat_id),
    )]
    pub async fn build_context(
        &self,
        chat_id: &Uuid,
        system_prompt: &str,
        thread_id: Option<&Uuid>,
    ) -> Result<ContextWindow, ContextError> {
        self.repo
            .get_chat(chat_id)
            .await?
            .ok_or(ContextError::ChatNotFound)?;

        let messages = self.repo.get_messages(chat_id, thread_id).await?;

        if self.config.disable_summarization {
            return Ok(self.verbatim_window(chat_id, system_prompt, &messages));
        }

        let split = messages.len().saturating_sub(self.config.recent_window_size);
        let (head, tail) = messages.split_at(split);

        if head.len() < self.config.summarize_after_messages {
            return Ok(self.verbatim_window(chat_id, system_prompt, &messages));
        }

        // head is non-empty here (summarize_after_messages >= 5), so the
        // range bounds below are well defined.
        let head_start = head[0].seq;
        let head_end = head[head.len() - 1].seq;

        let prior = self.repo.latest_summary(chat_id, thread_id).await?;

        // Pair the summary text with the range it covers: a reused persisted
        // summary may reach past head_end (a previous request ran with a
        // smaller recent window), and those messages must not also go out raw.
        let summary = match &prior {
            // The persisted summary already covers all of head: reuse it.
            // Never re-summarize, never compare text.
            Some(s) if s.end_seq >= head_end => Some((s.summary.clone(), s.end_seq)),
            _ => self
                .extend_summary(chat_id, thread_id, prior.as_ref(), head, head_start, head_end)
                .await
                .map(|text| (text, head_end)),
        };

        match summary {
            Some((text, covered_end)) => {
                let mut entries = Vec::with_capacity(tail.len() + 1);
                entries.push(ContextEntry {
                    role: MessageRole::System,
                    content: format!("Summary of the earlier conversation:\n{text}"),
                });
                entries.extend(
                    tail.iter()
                        .filter(|m| m.seq > covered_end)
                        .map(|m| entry_from_message(m)),
                );
                Ok(ContextWindow {
                    chat_id: *chat_id,
                    system_prompt: system_prompt.to_string(),
                    entries,
                })
            }
            // Degraded but correct: the full history goes out verbatim and
            // nothing is persisted. The next call re-evaluates and may retry.
            None => Ok(self.verbatim_window(chat_id, system_prompt, &messages)),
        }
    }

    /// Summarize the uncovered part of head and persist the merged summary.
    ///
    /// Returns `None` on any summarization failure, which the caller turns
    /// into the verbatim fallback.
    async fn extend_summary(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
        prior: Option<&ThreadSummary>,
        head: &[ChatMessage],
        head_start: u64,
        head_end: u64,
    ) -> Option<String> {
        let Some(backend) = &self.summary_backend else {
            tracing::warn!(%chat_id, "summarization needed but no backend resolved, sending history verbatim");
            return None;
        };

        let covered_end = prior.map(|s| s.end_seq).unwrap_or(0);
        let uncovered: Vec<ChatMessage> = head
            .iter()
            .filter(|m| m.seq > covered_end)
            .cloned()
            .collect();

        let timeout = Duration::from_secs(self.config.request_timeout_secs);
        let previous_text = prior.map(|s| s.summary.as_str());

        let text =
            match ThreadSummarizer::summarize(backend, previous_text, &uncovered, timeout).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(%chat_id, error = %e, "summarization failed, sending history verbatim");
                    return None;
                }
            };

        let summary = ThreadSummary {
            id: Uuid::now_v7(),
            chat_id: *chat_id,
            thread_id: thread_id.copied(),
            // Ranges always grow from the start of the thread, so the union
            // of covered ranges stays a prefix of the sequence.
            start_seq: prior.map(|s| s.start_seq).unwrap_or(head_start),
            end_seq: head_end,
            summary: text.clone(),
            created_at: Utc::now(),
        };

        match self.repo.put_summary(&summary).await {
            Ok(true) => Some(text),
            Ok(false) => {
                // A concurrent writer committed a longer range first. Our
                // text is still a valid summary of head for this request.
                tracing::debug!(%chat_id, end_seq = head_end, "summary write superseded by a longer range");
                Some(text)
            }
            Err(e) => {
                tracing::warn!(%chat_id, error = %e, "failed to persist summary, sending history verbatim");
                None
            }
        }
    }

    fn verbatim_window(
        &self,
        chat_id: &Uuid,
        system_prompt: &str,
        messages: &[ChatMessage],
    ) -> ContextWindow {
        ContextWindow {
            chat_id: *chat_id,
            system_prompt: system_prompt.to_string(),
            entries: messages.iter().map(entry_from_message).collect(),
        }
    }
}

fn entry_from_message(message: &ChatMessage) -> ContextEntry {
    ContextEntry {
        role: message.role,
        content: message.content.clone(),
    }
}
