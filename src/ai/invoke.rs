//! Model Invocation
//!
//! [`ModelClient`] is the single gateway every pipeline stage uses to talk to
//! the model. It owns backend selection, the per-call timeout and error
//! translation: callers only ever see `Configuration` (no backend, permanent),
//! `Upstream` (the backend failed) or `InvalidRequest` (bad arguments).
//!
//! Calls are never retried.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::provider::{CompletionRequest, SharedProvider, create_provider};
use super::timeout::with_timeout;
use crate::config::LlmConfig;
use crate::constants::invoke::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use crate::types::{ErrorCategory, ForgeError, Result, UpstreamError};

/// Generation settings for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvokeOptions {
    /// Sampling temperature in `[0, 1]`
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

impl InvokeOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ForgeError::invalid(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ForgeError::invalid("max_output_tokens must be greater than 0"));
        }
        Ok(())
    }
}

/// Shared model client
pub type SharedModel = Arc<ModelClient>;

/// Gateway to the configured model backend.
///
/// Built once from configuration and shared read-only across requests.
/// A client without a backend is valid: every call fails with
/// `ForgeError::Configuration`, which callers surface as "unavailable".
pub struct ModelClient {
    provider: Option<SharedProvider>,
    unavailable_reason: String,
    timeout: Duration,
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("backend", &self.backend_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelClient {
    pub fn new(provider: SharedProvider, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            unavailable_reason: String::new(),
            timeout,
        }
    }

    /// Client with no backend; every call fails with `reason`
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            provider: None,
            unavailable_reason: reason.into(),
            timeout: Duration::from_secs(crate::constants::network::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from configuration.
    ///
    /// A missing credential yields an unconfigured client rather than an
    /// error, so the process can still start and report itself unavailable.
    /// Any other provider error (unknown provider, bad endpoint) is returned.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        match create_provider(&config.provider_config()) {
            Ok(provider) => {
                debug!(
                    "Model backend: {} ({})",
                    provider.name(),
                    provider.model()
                );
                Ok(Self::new(provider, timeout))
            }
            Err(ForgeError::Configuration(reason)) => {
                warn!("{}", reason);
                Ok(Self {
                    timeout,
                    ..Self::unconfigured(reason)
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// "provider/model", or None when unconfigured
    pub fn backend_name(&self) -> Option<String> {
        self.provider
            .as_ref()
            .map(|p| format!("{}/{}", p.name(), p.model()))
    }

    /// Why the client has no backend
    pub fn unavailable_reason(&self) -> Option<&str> {
        if self.provider.is_some() {
            None
        } else {
            Some(&self.unavailable_reason)
        }
    }

    /// Ask the backend whether it is reachable
    pub async fn health_check(&self) -> Result<bool> {
        match &self.provider {
            Some(provider) => provider.health_check().await,
            None => Ok(false),
        }
    }

    /// Send one prompt and return the generated text, exactly as returned.
    pub async fn invoke(&self, prompt: &str, options: InvokeOptions) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(ForgeError::invalid("Prompt is required"));
        }
        options.validate()?;

        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ForgeError::Configuration(self.unavailable_reason.clone()))?;

        let request = CompletionRequest {
            prompt: prompt.to_string(),
            temperature: options.temperature,
            max_output_tokens: options.max_output_tokens,
        };

        debug!(
            "Invoking {} ({} prompt chars, temperature {}, max_tokens {})",
            provider.name(),
            prompt.chars().count(),
            options.temperature,
            options.max_output_tokens
        );

        let response = with_timeout(self.timeout, provider.complete(&request), "model call")
            .await
            .map_err(|e| Self::translate(e, provider.name()))?;

        debug!(
            "{} answered with {} chars in {}ms ({} tokens)",
            provider.name(),
            response.text.len(),
            response.timing.total_ms,
            response.usage.total()
        );

        Ok(response.text)
    }

    /// Collapse every backend failure into `Upstream`, keeping
    /// `Configuration` (permanent) and `Upstream` (already classified) as-is.
    fn translate(err: ForgeError, provider: &str) -> ForgeError {
        match err {
            ForgeError::Configuration(_) | ForgeError::Upstream(_) => err,
            ForgeError::Timeout { operation, duration } => UpstreamError::with_provider(
                ErrorCategory::Timeout,
                format!("{} timed out after {:?}", operation, duration),
                provider,
            )
            .into(),
            other => UpstreamError::with_provider(ErrorCategory::Unknown, other.to_string(), provider)
                .into(),
        }
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted provider for stage tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse};

    /// One scripted answer
    pub enum Reply {
        Text(String),
        Fail(ErrorCategory),
    }

    /// Provider that replays queued answers in order and records prompts.
    ///
    /// When the queue runs dry it answers with `default_reply`.
    pub struct ScriptedProvider {
        replies: Mutex<VecDeque<Reply>>,
        default_reply: String,
        prompts: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicU32,
    }

    impl ScriptedProvider {
        pub fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                default_reply: "ok".to_string(),
                prompts: Mutex::new(Vec::new()),
                call_count: AtomicU32::new(0),
            }
        }

        pub fn texts<I, S>(texts: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::new(texts.into_iter().map(|t| Reply::Text(t.into())).collect())
        }

        pub fn call_count(&self) -> u32 {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.clone());

            match self.replies.lock().unwrap().pop_front() {
                Some(Reply::Text(text)) => Ok(LlmResponse::text_only(text)),
                Some(Reply::Fail(category)) => {
                    Err(UpstreamError::with_provider(category, "scripted failure", "scripted").into())
                }
                None => Ok(LlmResponse::text_only(self.default_reply.clone())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    /// Client over a scripted provider, plus a handle to inspect it
    pub fn scripted_client(provider: ScriptedProvider) -> (SharedModel, Arc<ScriptedProvider>) {
        let provider = Arc::new(provider);
        let client = ModelClient::new(provider.clone(), Duration::from_secs(5));
        (Arc::new(client), provider)
    }
}
