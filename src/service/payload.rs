//! User-visible error payload.

use serde::Serialize;

use crate::types::{ErrorClass, ForgeError};

/// Structured error returned to callers.
///
/// Client errors carry only their message. Everything else also carries
/// the underlying error text in `detail`, which is acceptable for a
/// developer tool and makes upstream failures diagnosable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub status: u16,
    pub timestamp: String,
}

impl From<&ForgeError> for ErrorPayload {
    fn from(err: &ForgeError) -> Self {
        let (error, detail) = match err {
            ForgeError::InvalidRequest(msg) | ForgeError::NotFound(msg) => (msg.clone(), None),
            ForgeError::Configuration(msg) => (msg.clone(), None),
            other => {
                let error = match other.class() {
                    ErrorClass::Upstream => "LLM error",
                    _ => "Internal server error",
                };
                (error.to_string(), Some(other.to_string()))
            }
        };

        Self {
            error,
            detail,
            status: err.status_code(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;

    #[test]
    fn test_client_error_has_no_detail() {
        let payload = ErrorPayload::from(&ForgeError::invalid("Prompt is required"));
        assert_eq!(payload.error, "Prompt is required");
        assert_eq!(payload.status, 400);
        assert!(payload.detail.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.timestamp).is_ok());
    }

    #[test]
    fn test_upstream_error_carries_detail() {
        let err = ForgeError::upstream(ErrorCategory::RateLimit, "quota exceeded");
        let payload = ErrorPayload::from(&err);

        assert_eq!(payload.status, 502);
        assert_eq!(payload.error, "LLM error");
        assert!(payload.detail.unwrap().contains("quota exceeded"));
    }

    #[test]
    fn test_missing_backend_is_unavailable() {
        let err = ForgeError::Configuration("No LLM model configured. Please set GEMINI_KEY.".into());
        let json = serde_json::to_value(ErrorPayload::from(&err)).unwrap();

        assert_eq!(json["status"], 503);
        assert!(json.get("detail").is_none());
    }
}
