//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined
//! in `parlo-core`: Anthropic Claude and OpenAI-compatible endpoints
//! (hosted OpenAI and local models via Ollama).
//!
//! Also provides a provider factory ([`create_provider`]) and a connection
//! test function ([`test_provider_connection`]).
//!
//! [`LlmProvider`]: parlo_core::llm::provider::LlmProvider

pub mod anthropic;
pub mod openai_compat;

use secrecy::SecretString;

use parlo_core::llm::box_provider::BoxLlmProvider;
use parlo_types::llm::{CompletionRequest, LlmError, Message, MessageRole, ProviderType};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] for the given provider type and model.
///
/// # Arguments
///
/// * `provider_type` - Which backend to construct
/// * `model` - Default model identifier for the provider
/// * `api_key` - The resolved API key, if the backend requires one
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when the provider type
/// requires an API key and none is given.
pub fn create_provider(
    provider_type: &ProviderType,
    model: &str,
    api_key: Option<&str>,
) -> Result<BoxLlmProvider, LlmError> {
    match provider_type {
        ProviderType::Anthropic => {
            let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
            let secret = SecretString::from(key.to_string());
            let provider = AnthropicProvider::new(secret, model.to_string())?;
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            let provider = match api_key {
                Some(key) => OpenAiCompatibleProvider::openai(key, model),
                // No key means a local Ollama endpoint.
                None => OpenAiCompatibleProvider::local(model),
            };
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

/// Test provider connectivity by sending a minimal completion request.
///
/// Used when a new provider is configured to verify the API key and
/// endpoint are working. Sends a tiny "Hello" message with a minimal
/// token budget.
///
/// # Errors
///
/// Returns the LLM error if the provider fails to respond.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(), // Provider uses its configured default
        messages: vec![Message {
            role: MessageRole::User,
            content: "Hello".to_string(),
        }],
        system: None,
        max_tokens: 10,
        temperature: Some(0.0),
        stop_sequences: None,
    };
    provider.complete(&request).await?;
    Ok(())
}
