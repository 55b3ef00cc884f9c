//! Chat turn service.
//!
//! `ChatService` runs one full conversation turn: render the system prompt,
//! build the context window, run the main completion, and persist both sides
//! of the exchange. This is the seam the request handlers call into.

use std::sync::Arc;

use parlo_types::chat::MessageRole;
use parlo_types::config::ContextConfig;
use parlo_types::context::SummaryStrategy;
use parlo_types::error::{ConfigError, RepositoryError};
use uuid::Uuid;

use crate::context::{ContextError, ContextManager, SummaryBackend};
use crate::llm::manager::{ManagerError, ProviderManager};
use crate::llm::registry::ProviderRegistry;
use crate::prompt::SystemPromptBuilder;

use super::repository::ChatRepository;

/// Registry name of the designated secondary/offline summarization provider.
pub const LOCAL_PROVIDER_NAME: &str = "local";

/// Errors from running a chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat not found")]
    NotFound,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Context(ContextError),

    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

impl From<ContextError> for ChatError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::ChatNotFound => ChatError::NotFound,
            other => ChatError::Context(other),
        }
    }
}

/// Runs conversation turns against a chat repository and provider registry.
pub struct ChatService<R> {
    repo: Arc<R>,
    registry: Arc<ProviderRegistry>,
    /// Model used with the `local` provider for `local`-strategy summaries.
    local_summary_model: String,
}

impl<R: ChatRepository> ChatService<R> {
    pub fn new(
        repo: Arc<R>,
        registry: Arc<ProviderRegistry>,
        local_summary_model: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            registry,
            local_summary_model: local_summary_model.into(),
        }
    }

    /// Run one conversation turn and return the assistant's reply.
    ///
    /// The context window is built from the persisted log; the new user text
    /// rides along as the completion prompt and both sides of the exchange
    /// are appended after the completion succeeds, so a failed provider call
    /// leaves the log untouched.
    #[tracing::instrument(name = "chat_turn", skip(self, manager, config, user_text), fields(chat_id = %chat_id))]
    pub async fn respond(
        &self,
        manager: &ProviderManager,
        config: &ContextConfig,
        chat_id: &Uuid,
        user_text: &str,
        max_tokens: u32,
    ) -> Result<String, ChatError> {
        config.validate()?;

        let chat = self
            .repo
            .get_chat(chat_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        let system_prompt = SystemPromptBuilder::build(
            chat.topic_type,
            chat.topic_key.as_deref(),
            chat.topic_details.as_deref(),
            &chat.language,
            chat.level,
        );

        let backend = self.resolve_summary_backend(manager, config);
        let context_manager =
            ContextManager::new(Arc::clone(&self.repo), config.clone(), backend);
        let window = context_manager
            .build_context(chat_id, &system_prompt, chat.thread_id.as_ref())
            .await?;

        let response = manager.generate(&window, user_text, max_tokens).await?;

        let thread_id = chat.thread_id.as_ref();
        self.repo
            .append_message(chat_id, thread_id, MessageRole::User, user_text)
            .await?;
        self.repo
            .append_message(chat_id, thread_id, MessageRole::Assistant, &response.content)
            .await?;

        Ok(response.content)
    }

    /// Resolve the summarization backend for this request's strategy.
    ///
    /// An unresolvable backend is not an error: the context manager degrades
    /// to verbatim history, matching the summarization failure path.
    fn resolve_summary_backend(
        &self,
        manager: &ProviderManager,
        config: &ContextConfig,
    ) -> Option<SummaryBackend> {
        match config.summarization_provider {
            SummaryStrategy::Same => {
                manager
                    .active_backend()
                    .map(|(provider, model)| SummaryBackend {
                        provider,
                        model: model.to_string(),
                    })
            }
            SummaryStrategy::Local => {
                self.registry
                    .get(LOCAL_PROVIDER_NAME)
                    .map(|provider| SummaryBackend {
                        provider,
                        model: self.local_summary_model.clone(),
                    })
            }
        }
    }
}
