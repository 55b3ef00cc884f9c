//! Configuration types and per-provider defaults for OpenAI-compatible providers.
//!
//! Each endpoint that speaks the OpenAI chat completions protocol gets a
//! factory function returning an [`OpenAiCompatConfig`] with the correct
//! base URL and capabilities.

use parlo_types::llm::ProviderCapabilities;

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "local").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Default model identifier (e.g., "gpt-4o", "llama3.1:8b").
    pub model: String,
    /// What this provider supports.
    pub capabilities: ProviderCapabilities,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`; 128K context, 16K output.
pub fn openai_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key: api_key.into(),
        model: model.into(),
        capabilities: ProviderCapabilities {
            max_context_tokens: 128_000,
            max_output_tokens: 16_384,
        },
    }
}

/// Local model default configuration (Ollama's OpenAI-compatible endpoint).
///
/// Base URL: `http://localhost:11434/v1`. Ollama ignores the API key but
/// the OpenAI client requires one, so a dummy value is sent.
/// Conservative limits: small local models commonly run with an 8K window.
pub fn local_defaults(model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "local".into(),
        base_url: "http://localhost:11434/v1".into(),
        api_key: "ollama".into(),
        model: model.into(),
        capabilities: ProviderCapabilities {
            max_context_tokens: 8_192,
            max_output_tokens: 2_048,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults("sk-test", "gpt-4o");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.capabilities.max_context_tokens, 128_000);
        assert_eq!(config.capabilities.max_output_tokens, 16_384);
    }

    #[test]
    fn test_local_defaults() {
        let config = local_defaults("llama3.1:8b");
        assert_eq!(config.provider_name, "local");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.api_key, "ollama");
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.capabilities.max_context_tokens, 8_192);
        assert_eq!(config.capabilities.max_output_tokens, 2_048);
    }
}
