//! LlmProvider trait definition.
//!
//! This is the core abstraction that all LLM providers implement.
//! Uses RPITIT for `complete`; implementations live in parlo-infra
//! (e.g., `AnthropicProvider`, `OpenAiCompatibleProvider`).

use parlo_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

/// Trait for LLM provider backends (Anthropic, OpenAI-compatible, local).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Provider
/// errors (network/auth/rate-limit) surface as typed [`LlmError`] values;
/// the trait performs no retries and no cross-provider fallback -- any
/// fallback policy belongs to the caller.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic", "local").
    fn name(&self) -> &str;

    /// What this provider supports (context and output token limits).
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
