//! Shared domain types for Parlo.
//!
//! This crate contains the core domain types used across the Parlo platform:
//! chats, messages, thread summaries, context windows, and their associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
