//! Request-scoped provider/model selection and generation.
//!
//! `ProviderManager` replaces the mutable "current provider" singleton with
//! a value constructed per request: selection state lives inside the manager
//! and is never shared across concurrently-executing, differently-configured
//! requests.

use std::sync::Arc;
use std::time::Duration;

use parlo_observe::genai_attrs;
use parlo_types::context::ContextWindow;
use parlo_types::llm::{CompletionRequest, CompletionResponse, LlmError, Message, MessageRole};

use super::box_provider::BoxLlmProvider;
use super::registry::ProviderRegistry;

/// Errors from provider manager operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("provider manager used before initialization")]
    NotInitialized,

    #[error("no model selected for provider '{0}'")]
    NoModelSelected(String),

    #[error("unknown provider: '{0}'")]
    UnknownProvider(String),

    #[error(transparent)]
    Provider(#[from] LlmError),
}

/// The currently selected backend within a manager.
struct ActiveProvider {
    id: String,
    provider: Arc<BoxLlmProvider>,
    model: Option<String>,
}

/// Per-request LLM provider manager.
///
/// Lifecycle: `Uninitialized` -> `initialize(provider)` ->
/// `set_model(model)` -> `generate(..)`. Calling `generate` before
/// `initialize` fails with [`ManagerError::NotInitialized`].
///
/// Provider errors propagate as typed failures; the manager performs no
/// automatic cross-provider fallback.
pub struct ProviderManager {
    registry: Arc<ProviderRegistry>,
    active: Option<ActiveProvider>,
    request_timeout: Duration,
}

impl ProviderManager {
    /// Create an uninitialized manager over the given registry.
    pub fn new(registry: Arc<ProviderRegistry>, request_timeout: Duration) -> Self {
        Self {
            registry,
            active: None,
            request_timeout,
        }
    }

    /// Select the active provider by registry name.
    ///
    /// Idempotent: re-initializing with the already-active provider id is a
    /// no-op that keeps the selected model and returns `false`. A different
    /// id tears down the previous selection (including its model) and
    /// resolves the new backend, returning `true`.
    pub fn initialize(&mut self, provider_id: &str) -> Result<bool, ManagerError> {
        if let Some(active) = &self.active {
            if active.id == provider_id {
                return Ok(false);
            }
        }

        let provider = self
            .registry
            .get(provider_id)
            .ok_or_else(|| ManagerError::UnknownProvider(provider_id.to_string()))?;

        tracing::debug!(provider = provider_id, "provider initialized");
        self.active = Some(ActiveProvider {
            id: provider_id.to_string(),
            provider,
            model: None,
        });
        Ok(true)
    }

    /// Select the model used by subsequent `generate` calls.
    pub fn set_model(&mut self, model_id: &str) -> Result<(), ManagerError> {
        let active = self.active.as_mut().ok_or(ManagerError::NotInitialized)?;
        active.model = Some(model_id.to_string());
        Ok(())
    }

    /// Name of the active provider, if initialized.
    pub fn active_provider_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// The active backend and model, for callers that need to reuse the
    /// chat provider elsewhere (e.g., a `same`-strategy summarization call).
    pub fn active_backend(&self) -> Option<(Arc<BoxLlmProvider>, &str)> {
        let active = self.active.as_ref()?;
        let model = active.model.as_deref()?;
        Some((Arc::clone(&active.provider), model))
    }

    /// Run a completion over the given context window plus a new user prompt.
    ///
    /// Assembles system prompt + context entries + the prompt into a single
    /// request and awaits the provider under the configured timeout. On
    /// timeout the call fails with [`LlmError::Timeout`]; it never hangs a
    /// request past the transport budget.
    #[tracing::instrument(
        name = "generate",
        skip(self, window, prompt),
        fields(
            chat_id = %window.chat_id,
            entry_count = window.entries.len(),
        )
    )]
    pub async fn generate(
        &self,
        window: &ContextWindow,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<CompletionResponse, ManagerError> {
        let active = self.active.as_ref().ok_or(ManagerError::NotInitialized)?;
        let model = active
            .model
            .as_ref()
            .ok_or_else(|| ManagerError::NoModelSelected(active.id.clone()))?;

        let mut messages: Vec<Message> = window
            .entries
            .iter()
            .map(|e| Message {
                role: e.role,
                content: e.content.clone(),
            })
            .collect();
        messages.push(Message {
            role: MessageRole::User,
            content: prompt.to_string(),
        });

        let request = CompletionRequest {
            model: model.clone(),
            messages,
            system: Some(window.system_prompt.clone()),
            max_tokens,
            temperature: None,
            stop_sequences: None,
        };

        let response = tokio::time::timeout(self.request_timeout, active.provider.complete(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.request_timeout.as_secs()))??;

        tracing::debug!(
            operation = genai_attrs::OP_CHAT,
            provider = %active.id,
            model = %model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            response_id = %response.id,
            "completion finished"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmProvider;
    use parlo_types::llm::{ProviderCapabilities, StopReason, Usage};
    use std::future::Future;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    struct MockProvider {
        name: String,
        capabilities: ProviderCapabilities,
        calls: Arc<AtomicU32>,
        fail: bool,
    }

    impl MockProvider {
        fn ok(name: &str, calls: Arc<AtomicU32>) -> Self {
            Self {
                name: name.to_string(),
                capabilities: test_caps(),
                calls,
                fail: false,
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.to_string(),
                capabilities: test_caps(),
                calls: Arc::new(AtomicU32::new(0)),
                fail: true,
            }
        }
    }

    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            let name = self.name.clone();
            let model = request.model.clone();
            async move {
                if fail {
                    return Err(LlmError::Provider {
                        message: "mock failure".to_string(),
                    });
                }
                Ok(CompletionResponse {
                    id: format!("resp-{name}"),
                    content: format!("Hello from {name}"),
                    model,
                    stop_reason: StopReason::EndTurn,
                    usage: Usage {
                        input_tokens: 10,
                        output_tokens: 20,
                    },
                })
            }
        }
    }

    fn test_caps() -> ProviderCapabilities {
        ProviderCapabilities {
            max_context_tokens: 200_000,
            max_output_tokens: 8_192,
        }
    }

    fn test_registry() -> Arc<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();
        registry.register(
            "anthropic",
            BoxLlmProvider::new(MockProvider::ok("anthropic", Arc::new(AtomicU32::new(0)))),
        );
        registry.register(
            "local",
            BoxLlmProvider::new(MockProvider::ok("local", Arc::new(AtomicU32::new(0)))),
        );
        Arc::new(registry)
    }

    fn test_window() -> ContextWindow {
        ContextWindow {
            chat_id: Uuid::now_v7(),
            system_prompt: "You are a Spanish tutor.".to_string(),
            entries: vec![],
        }
    }

    #[tokio::test]
    async fn test_generate_before_initialize_fails() {
        let manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        let err = manager
            .generate(&test_window(), "Hola", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::NotInitialized));
    }

    #[tokio::test]
    async fn test_set_model_before_initialize_fails() {
        let mut manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        let err = manager.set_model("claude-sonnet-4-20250514").unwrap_err();
        assert!(matches!(err, ManagerError::NotInitialized));
    }

    #[tokio::test]
    async fn test_initialize_unknown_provider() {
        let mut manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        let err = manager.initialize("missing").unwrap_err();
        assert!(matches!(err, ManagerError::UnknownProvider(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let mut manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        assert!(manager.initialize("anthropic").unwrap());
        manager.set_model("claude-sonnet-4-20250514").unwrap();

        // Second initialize with the same id performs no setup and keeps the model.
        assert!(!manager.initialize("anthropic").unwrap());
        assert!(manager.active_backend().is_some());
    }

    #[tokio::test]
    async fn test_initialize_different_provider_resets_model() {
        let mut manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        manager.initialize("anthropic").unwrap();
        manager.set_model("claude-sonnet-4-20250514").unwrap();

        assert!(manager.initialize("local").unwrap());
        assert_eq!(manager.active_provider_id(), Some("local"));
        // The new selection has no model yet.
        assert!(manager.active_backend().is_none());
    }

    #[tokio::test]
    async fn test_generate_without_model_fails() {
        let mut manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        manager.initialize("anthropic").unwrap();
        let err = manager
            .generate(&test_window(), "Hola", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ManagerError::NoModelSelected(name) if name == "anthropic"));
    }

    #[tokio::test]
    async fn test_generate_succeeds() {
        let mut manager = ProviderManager::new(test_registry(), Duration::from_secs(5));
        manager.initialize("anthropic").unwrap();
        manager.set_model("claude-sonnet-4-20250514").unwrap();

        let response = manager.generate(&test_window(), "Hola", 1024).await.unwrap();
        assert_eq!(response.content, "Hello from anthropic");
        assert_eq!(response.model, "claude-sonnet-4-20250514");
    }

    #[tokio::test]
    async fn test_generate_propagates_provider_error() {
        let mut registry = ProviderRegistry::new();
        registry.register("broken", BoxLlmProvider::new(MockProvider::failing("broken")));
        let mut manager = ProviderManager::new(Arc::new(registry), Duration::from_secs(5));
        manager.initialize("broken").unwrap();
        manager.set_model("some-model").unwrap();

        let err = manager
            .generate(&test_window(), "Hola", 1024)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::Provider(LlmError::Provider { .. })
        ));
    }
}
