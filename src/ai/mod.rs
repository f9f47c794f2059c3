//! AI Integration Layer
//!
//! Provider backends, the shared model client and the output cleanup
//! helpers the pipeline stages build on.

pub mod invoke;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use invoke::{InvokeOptions, ModelClient, SharedModel};
pub use provider::{
    CompletionRequest, GeminiProvider, LlmProvider, LlmResponse, OpenAiProvider, ProviderConfig,
    ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
pub use timeout::with_timeout;
pub use validation::{parse_object, parse_or_fallback, strip_code_fence};
