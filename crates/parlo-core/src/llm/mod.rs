//! LLM provider abstractions for Parlo.
//!
//! This module defines the core traits and utilities for LLM provider integration:
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `ProviderRegistry`: name-indexed lookup of registered backends
//! - `ProviderManager`: request-scoped provider/model selection and generation

pub mod box_provider;
pub mod manager;
pub mod provider;
pub mod registry;
