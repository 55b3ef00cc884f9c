//! SQLite persistence for Parlo.
//!
//! `DatabasePool` provides split reader/writer pools in WAL mode;
//! `SqliteChatRepository` implements the `ChatRepository` port.

pub mod chat;
pub mod pool;

pub use chat::SqliteChatRepository;
pub use pool::DatabasePool;
