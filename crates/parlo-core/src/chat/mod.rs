//! Chat persistence abstractions and the chat turn service for Parlo.
//!
//! This module defines the `ChatRepository` trait that the infrastructure
//! layer implements, and `ChatService` which runs one full conversation turn
//! (context construction, completion, message persistence).

pub mod repository;
pub mod service;
