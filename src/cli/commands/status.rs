//! Status Command
//!
//! Display backend, database and project status.

use crate::ai::ModelClient;
use crate::cli::ui::Output;
use crate::cli::util::open_database;
use crate::config::ConfigLoader;
use crate::service::HealthReport;
use crate::storage::ProjectStore;
use crate::types::Result;

pub async fn run(format: &str, check_backend: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let model = ModelClient::from_config(&config.llm)?;

    // Status is informational: an unreachable database is reported, not raised
    let db = open_database(&config);
    let store = db.as_ref().ok().map(|d| d as &dyn ProjectStore);
    let mut report = HealthReport::check(&model, store);
    if let Err(e) = &db {
        report.status = "degraded".to_string();
        report.database = "error".to_string();
        report.database_error = Some(e.to_string());
    }

    let reachable = if check_backend && model.is_configured() {
        Some(model.health_check().await.unwrap_or(false))
    } else {
        None
    };

    if format == "json" {
        let mut value = serde_json::to_value(&report)?;
        if let Some(reachable) = reachable {
            value["backend_reachable"] = reachable.into();
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let output = Output::new();
    output.header("sysforge Status");
    output.field("Status", &report.status);
    output.field("Version", &report.version);

    output.section("Model");
    match &report.backend {
        Some(backend) => output.field("Backend", backend),
        None => output.warning(report.model_error.as_deref().unwrap_or("Not configured")),
    }
    if let Some(reachable) = reachable {
        output.field("Reachable", if reachable { "yes" } else { "no" });
    }

    output.section("Database");
    output.field("Path", config.storage.database_path.display());
    output.field("State", &report.database);
    if let Some(err) = &report.database_error {
        output.error(err);
    }

    if let Ok(db) = &db {
        let projects = db.list_projects()?;
        output.section(&format!("Projects ({})", projects.len()));
        for project in projects {
            output.field(&project.name, &project.status);
        }
    }

    Ok(())
}
