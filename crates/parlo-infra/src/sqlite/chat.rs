//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parlo-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader pool for
//! SELECTs and the single-connection writer pool for mutations.
//!
//! `put_summary` runs its read-check-insert inside one transaction on the
//! single-writer pool, which serializes concurrent summary writes and makes
//! the "longest covered range wins" rule atomic.

use parlo_core::chat::repository::ChatRepository;
use parlo_types::chat::{CefrLevel, Chat, ChatMessage, MessageRole, ThreadSummary, TopicType};
use parlo_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Create a chat row.
    ///
    /// Chats are created by the external chat flow (out of scope for the
    /// context engine); this exists for setup and tests.
    pub async fn create_chat(&self, chat: &Chat) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chats (id, topic_type, topic_key, topic_details, language, level, thread_id, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(chat.id.to_string())
        .bind(chat.topic_type.to_string())
        .bind(&chat.topic_key)
        .bind(&chat.topic_details)
        .bind(&chat.language)
        .bind(chat.level.to_string())
        .bind(chat.thread_id.map(|id| id.to_string()))
        .bind(format_datetime(&chat.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain Chat.
struct ChatRow {
    id: String,
    topic_type: String,
    topic_key: Option<String>,
    topic_details: Option<String>,
    language: String,
    level: String,
    thread_id: Option<String>,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            topic_type: row.try_get("topic_type")?,
            topic_key: row.try_get("topic_key")?,
            topic_details: row.try_get("topic_details")?,
            language: row.try_get("language")?,
            level: row.try_get("level")?,
            thread_id: row.try_get("thread_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        let id = parse_uuid(&self.id, "chat id")?;
        let topic_type: TopicType = self
            .topic_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let level: CefrLevel = self
            .level
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let thread_id = self
            .thread_id
            .as_deref()
            .map(|s| parse_uuid(s, "thread_id"))
            .transpose()?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Chat {
            id,
            topic_type,
            topic_key: self.topic_key,
            topic_details: self.topic_details,
            language: self.language,
            level,
            thread_id,
            created_at,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    id: String,
    chat_id: String,
    thread_id: Option<String>,
    role: String,
    content: String,
    seq: i64,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            thread_id: row.try_get("thread_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            seq: row.try_get("seq")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = parse_uuid(&self.id, "message id")?;
        let chat_id = parse_uuid(&self.chat_id, "chat_id")?;
        let thread_id = self
            .thread_id
            .as_deref()
            .map(|s| parse_uuid(s, "thread_id"))
            .transpose()?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ChatMessage {
            id,
            chat_id,
            thread_id,
            role,
            content: self.content,
            seq: self.seq as u64,
            created_at,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ThreadSummary.
struct ThreadSummaryRow {
    id: String,
    chat_id: String,
    thread_id: Option<String>,
    start_seq: i64,
    end_seq: i64,
    summary: String,
    created_at: String,
}

impl ThreadSummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            thread_id: row.try_get("thread_id")?,
            start_seq: row.try_get("start_seq")?,
            end_seq: row.try_get("end_seq")?,
            summary: row.try_get("summary")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_summary(self) -> Result<ThreadSummary, RepositoryError> {
        let id = parse_uuid(&self.id, "summary id")?;
        let chat_id = parse_uuid(&self.chat_id, "chat_id")?;
        let thread_id = self
            .thread_id
            .as_deref()
            .map(|s| parse_uuid(s, "thread_id"))
            .transpose()?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ThreadSummary {
            id,
            chat_id,
            thread_id,
            start_seq: self.start_seq as u64,
            end_seq: self.end_seq as u64,
            summary: self.summary,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {what}: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn get_chat(&self, chat_id: &Uuid) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn get_messages(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_messages
               WHERE chat_id = ? AND IFNULL(thread_id, '') = IFNULL(?, '')
               ORDER BY seq ASC"#,
        )
        .bind(chat_id.to_string())
        .bind(thread_id.map(|id| id.to_string()))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn append_message(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
        role: MessageRole,
        content: &str,
    ) -> Result<ChatMessage, RepositoryError> {
        // The single-writer pool serializes concurrent appends, so the
        // MAX(seq)+1 read and the insert cannot interleave.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query(
            r#"SELECT COALESCE(MAX(seq), 0) AS max_seq FROM chat_messages
               WHERE chat_id = ? AND IFNULL(thread_id, '') = IFNULL(?, '')"#,
        )
        .bind(chat_id.to_string())
        .bind(thread_id.map(|id| id.to_string()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let max_seq: i64 = row
            .try_get("max_seq")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let message = ChatMessage {
            id: Uuid::now_v7(),
            chat_id: *chat_id,
            thread_id: thread_id.copied(),
            role,
            content: content.to_string(),
            seq: (max_seq + 1) as u64,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO chat_messages (id, chat_id, thread_id, role, content, seq, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.thread_id.map(|id| id.to_string()))
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(message.seq as i64)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(message)
    }

    async fn latest_summary(
        &self,
        chat_id: &Uuid,
        thread_id: Option<&Uuid>,
    ) -> Result<Option<ThreadSummary>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT * FROM thread_summaries
               WHERE chat_id = ? AND IFNULL(thread_id, '') = IFNULL(?, '')
               ORDER BY end_seq DESC LIMIT 1"#,
        )
        .bind(chat_id.to_string())
        .bind(thread_id.map(|id| id.to_string()))
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let summary_row = ThreadSummaryRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(summary_row.into_summary()?))
            }
            None => Ok(None),
        }
    }

    async fn put_summary(&self, summary: &ThreadSummary) -> Result<bool, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query(
            r#"SELECT COALESCE(MAX(end_seq), 0) AS max_end FROM thread_summaries
               WHERE chat_id = ? AND IFNULL(thread_id, '') = IFNULL(?, '')"#,
        )
        .bind(summary.chat_id.to_string())
        .bind(summary.thread_id.map(|id| id.to_string()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let max_end: i64 = row
            .try_get("max_end")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Monotonic last-writer-wins: only a strictly longer covered range
        // commits. A shorter or equal range is discarded, not an error.
        if summary.end_seq as i64 <= max_end {
            tracing::debug!(
                chat_id = %summary.chat_id,
                end_seq = summary.end_seq,
                stored_max = max_end,
                "summary write discarded, stored range is not shorter"
            );
            return Ok(false);
        }

        sqlx::query(
            r#"INSERT INTO thread_summaries (id, chat_id, thread_id, start_seq, end_seq, summary, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(summary.id.to_string())
        .bind(summary.chat_id.to_string())
        .bind(summary.thread_id.map(|id| id.to_string()))
        .bind(summary.start_seq as i64)
        .bind(summary.end_seq as i64)
        .bind(&summary.summary)
        .bind(format_datetime(&summary.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(true)
    }

    async fn delete_chat(&self, chat_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
