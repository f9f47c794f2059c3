//! Timeout wrapper for async operations.
//!
//! The model client wraps every outbound call in [`with_timeout`] on top of
//! the HTTP client's own timeout, so a stuck provider can't hold a request
//! forever.

use std::future::Future;
use std::time::Duration;

use crate::types::{ForgeError, Result};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ForgeError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, ForgeError>(42) },
            "test operation",
        )
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ForgeError>(42)
            },
            "slow operation",
        )
        .await;

        match result {
            Err(ForgeError::Timeout { operation, .. }) => assert_eq!(operation, "slow operation"),
            other => panic!("Expected timeout error, got {:?}", other),
        }
    }
}
