//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ai::{ModelClient, SharedModel};
use crate::config::{Config, ConfigLoader};
use crate::pipeline::GenerationPipeline;
use crate::service::GenerationService;
use crate::storage::{Database, ProjectStore, SharedDatabase};
use crate::types::{ForgeError, Result, ResultExt};

/// Command execution context
///
/// Everything a generation command needs: merged configuration, the shared
/// model client and the project database.
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    pub model: SharedModel,
    pub db: SharedDatabase,
}

impl CommandContext {
    /// Load config, build the model client and open the database
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        let model = Arc::new(ModelClient::from_config(&config.llm)?);
        let db = open_database(&config)?;

        Ok(Self {
            config,
            model,
            db: Arc::new(db),
        })
    }

    pub fn pipeline(&self) -> GenerationPipeline {
        GenerationPipeline::new(self.model.clone(), &self.config)
    }

    pub fn service(&self) -> GenerationService {
        GenerationService::new(self.pipeline()).with_store(self.db.clone())
    }

    /// Id of the named project, created on first use
    pub fn ensure_project(&self, name: &str, goal: Option<&str>) -> Result<i64> {
        if let Some(project) = self.db.find_project(name)? {
            return Ok(project.id);
        }
        let id = self.db.create_project(name, goal)?;
        tracing::info!("Created project '{}' (id {})", name, id);
        Ok(id)
    }

    /// Id of an existing project
    pub fn require_project(&self, name: &str) -> Result<i64> {
        self.db
            .find_project(name)?
            .map(|p| p.id)
            .ok_or_else(|| ForgeError::NotFound(format!("Project '{}'", name)))
    }
}

/// Open and initialize the configured database
pub fn open_database(config: &Config) -> Result<Database> {
    let db = Database::open(&config.storage.database_path)?;
    db.initialize()?;
    Ok(db)
}

/// Read a JSON document from a file, or from stdin when the path is `-`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context_fn(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&text)
        .map_err(|e| ForgeError::invalid(format!("{} is not valid JSON: {}", path.display(), e)))
}

/// Pretty JSON to stdout, or to a file when one is given
pub fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)
                .with_context_fn(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RefinedSpecification;
    use tempfile::TempDir;

    #[test]
    fn test_json_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/spec.json");
        let spec = RefinedSpecification {
            goal: "Todo".to_string(),
            ..Default::default()
        };

        write_json(&spec, Some(path.as_path())).unwrap();
        let back: RefinedSpecification = read_json(&path).unwrap();

        assert_eq!(back, spec);
    }

    #[test]
    fn test_invalid_json_is_a_client_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plan.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
