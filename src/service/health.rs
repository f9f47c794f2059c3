//! Health report: is a model backend configured, is the database reachable.

use serde::Serialize;

use crate::ai::ModelClient;
use crate::storage::ProjectStore;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// "healthy" only when both the backend and the database are usable
    pub status: String,
    pub model_configured: bool,
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    pub version: String,
    pub timestamp: String,
}

impl HealthReport {
    /// Build a report without calling the model backend
    pub fn check(model: &ModelClient, store: Option<&dyn ProjectStore>) -> Self {
        let (database, database_error) = match store.map(|s| s.ping()) {
            Some(Ok(())) => ("connected", None),
            Some(Err(e)) => ("error", Some(e.to_string())),
            None => ("disabled", None),
        };

        let model_configured = model.is_configured();
        let healthy = model_configured && database != "error";

        Self {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            model_configured,
            backend: model.backend_name(),
            model_error: model.unavailable_reason().map(str::to_string),
            database: database.to_string(),
            database_error,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_unconfigured_model_is_degraded() {
        let model = ModelClient::unconfigured("No LLM model configured");
        let report = HealthReport::check(&model, None);

        assert_eq!(report.status, "degraded");
        assert!(!report.model_configured);
        assert_eq!(report.database, "disabled");
        assert_eq!(report.model_error.as_deref(), Some("No LLM model configured"));
    }

    #[test]
    fn test_reachable_database_is_reported() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let model = ModelClient::unconfigured("missing key");

        let report = HealthReport::check(&model, Some(&db as &dyn ProjectStore));

        assert_eq!(report.database, "connected");
        assert!(report.database_error.is_none());
        assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
    }
}
