//! Business logic and repository trait definitions for Parlo.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the conversation context manager, the thread
//! summarizer, and the LLM provider abstraction. It depends only on
//! `parlo-types` -- never on `parlo-infra` or any database/IO crate.

pub mod chat;
pub mod context;
pub mod llm;
pub mod prompt;
