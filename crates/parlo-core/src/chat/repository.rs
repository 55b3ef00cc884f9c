//! ChatRepository trait definition.
//!
//! Provides read access to the append-only message log and the thread
//! summary store. Uses native async fn in traits (RPITIT, Rust 2024 edition).

use parlo_types::chat::{Chat, ChatMessage, MessageRole, ThreadSummary};
use parlo_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat, message, and thread summary persistence.
///
/// Implementations live in parlo-infra (e.g., `SqliteChatRepository`).
///
/// Messages are append-only and created by the chat flow only -- the context
/// manager reads them but never writes. Thread summaries are append-only as
/// well: `put_summary` commits only when the new covered range strictly
/// extends the stored one, so a longer summary can never be lost to a
/// shorter concurrent one.
pub trait ChatRepository: Send + Sync {
    /// Get a chat by its unique ID.
    fn get_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Get all messages for a chat thread, ordered by seq ASC.
    ///
    /// `thread_id = None` addresses the main thread.
    fn get_messages(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Append a message to a chat thread.
    ///
    /// The store assigns the next `seq` and returns the stored message.
    fn append_message(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
        role: MessageRole,
        content: &str,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// Get the thread summary with the maximal covered range, if any.
    fn latest_summary(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
    ) -> impl std::future::Future<Output = Result<Option<ThreadSummary>, RepositoryError>> + Send;

    /// Store a new thread summary under the monotonic last-writer-wins rule.
    ///
    /// Commits only if `summary.end_seq` strictly exceeds the current stored
    /// maximum for the (chat, thread); returns whether the write committed.
    /// A discarded write is not an error -- the caller proceeds with its own
    /// in-memory summary text for the current request.
    fn put_summary(
        &self,
        summary: &ThreadSummary,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete a chat, cascading its messages and summaries.
    fn delete_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
