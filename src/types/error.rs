//! Unified Error Type System
//!
//! Centralized error types for the generation pipeline.
//!
//! ## Error Classes
//!
//! - **Client**: malformed requests, rejected before any model call
//! - **Unavailable**: no model backend configured (permanent, never retried)
//! - **Upstream**: the model backend failed or answered with garbage
//! - **Internal**: storage, IO and everything else
//!
//! Stages decide for themselves what to do with an upstream failure: the
//! refiner, composer and reviewer absorb it into a fallback value, the file
//! generator propagates it and the refactorer keeps the original file.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Upstream Error Categories
// =============================================================================

/// Categories for failures reported by a model backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Quota or rate limit rejection
    RateLimit,
    /// Credential rejected by the backend
    Auth,
    /// Connectivity issues
    Network,
    /// Outbound call exceeded the configured timeout
    Timeout,
    /// Backend returned a 5xx or is otherwise down
    Unavailable,
    /// Backend rejected the request shape
    BadRequest,
    /// Response body could not be decoded
    ParseError,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// Upstream Error
// =============================================================================

/// Failure reported by (or while talking to) a model backend
#[derive(Debug, Clone)]
pub struct UpstreamError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for UpstreamError {}

impl UpstreamError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }

    /// Classify an HTTP status returned by a backend
    pub fn from_http_status(status: u16, message: impl Into<String>, provider: &str) -> Self {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 404 | 422 => ErrorCategory::BadRequest,
            500..=599 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        Self::with_provider(category, message, provider)
    }

    /// Classify a transport error from reqwest
    pub fn from_transport(err: &reqwest::Error, provider: &str) -> Self {
        let category = if err.is_timeout() {
            ErrorCategory::Timeout
        } else if err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else {
            ErrorCategory::Unknown
        };
        Self::with_provider(category, format!("{} request failed: {}", provider, err), provider)
    }
}

// =============================================================================
// Error Class (user-visible)
// =============================================================================

/// Coarse classification used for the user-visible error payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Unavailable,
    Upstream,
    Internal,
}

impl ErrorClass {
    /// HTTP-style status code for this class
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Client => 400,
            Self::Unavailable => 503,
            Self::Upstream => 502,
            Self::Internal => 500,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ForgeError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Model Errors
    // -------------------------------------------------------------------------
    /// No model backend available. Permanent for the life of the process.
    #[error("Model backend not configured: {0}")]
    Configuration(String),

    /// Backend call failed or returned an unusable response
    #[error("Upstream model error: {0}")]
    Upstream(UpstreamError),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    /// A stage produced a placeholder result and the pipeline is configured
    /// to halt on placeholders
    #[error("Stage '{stage}' fell back to a placeholder result")]
    DegradedStage { stage: String },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<UpstreamError> for ForgeError {
    fn from(err: UpstreamError) -> Self {
        ForgeError::Upstream(err)
    }
}

impl From<figment::Error> for ForgeError {
    fn from(err: figment::Error) -> Self {
        ForgeError::Settings(format!("Configuration error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ForgeError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an upstream error with the given category
    pub fn upstream(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::new(category, message))
    }

    /// Create an invalid-request error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// User-visible class of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidRequest(_) | Self::NotFound(_) => ErrorClass::Client,
            Self::Configuration(_) => ErrorClass::Unavailable,
            Self::Upstream(_) | Self::Timeout { .. } | Self::DegradedStage { .. } => {
                ErrorClass::Upstream
            }
            _ => ErrorClass::Internal,
        }
    }

    /// HTTP-style status code, 404 for missing resources
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            other => other.class().status_code(),
        }
    }

    /// Configuration errors are permanent and must never be absorbed by a
    /// stage fallback
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| ForgeError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| ForgeError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Timeout.to_string(), "TIMEOUT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_classify_http_status() {
        let quota = UpstreamError::from_http_status(429, "Quota exceeded", "gemini");
        assert_eq!(quota.category, ErrorCategory::RateLimit);

        let auth = UpstreamError::from_http_status(403, "Forbidden", "gemini");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server = UpstreamError::from_http_status(503, "Overloaded", "openai");
        assert_eq!(server.category, ErrorCategory::Unavailable);
    }

    #[test]
    fn test_upstream_error_display() {
        let err = UpstreamError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = UpstreamError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_error_class_routing() {
        assert_eq!(ForgeError::invalid("Prompt is required").class(), ErrorClass::Client);
        assert_eq!(
            ForgeError::Configuration("no key".into()).status_code(),
            503
        );
        assert_eq!(
            ForgeError::upstream(ErrorCategory::Network, "down").status_code(),
            502
        );
        assert_eq!(ForgeError::NotFound("project 7".into()).status_code(), 404);
        assert_eq!(ForgeError::Storage("disk".into()).class(), ErrorClass::Internal);
    }

    #[test]
    fn test_configuration_is_permanent() {
        assert!(ForgeError::Configuration("missing".into()).is_configuration());
        assert!(!ForgeError::upstream(ErrorCategory::Unknown, "x").is_configuration());
    }
}
