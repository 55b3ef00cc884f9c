//! Infrastructure layer for Parlo.
//!
//! Contains implementations of the repository traits defined in `parlo-core`
//! (SQLite storage) and the concrete LLM provider backends (Anthropic
//! Messages API, OpenAI-compatible endpoints including a local one).

pub mod llm;
pub mod sqlite;
