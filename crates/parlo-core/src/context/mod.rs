//! Conversation context management for Parlo.
//!
//! `ContextManager` decides how much conversation history is submitted to
//! the model per turn: the full log, a fixed recent window, or a compressed
//! summary of older turns plus the recent window. `ThreadSummarizer` runs
//! the secondary summarization call.

pub mod manager;
pub mod summarizer;

pub use manager::{ContextError, ContextManager};
pub use summarizer::{SummaryBackend, ThreadSummarizer};
