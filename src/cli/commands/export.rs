//! Export Command
//!
//! Write a project's stored files into a directory.

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::open_database;
use crate::config::ConfigLoader;
use crate::storage::{ProjectStore, export_files};
use crate::types::{ForgeError, Result};

pub fn run(project: &str, out: &Path) -> Result<()> {
    let config = ConfigLoader::load()?;
    let db = open_database(&config)?;

    let record = db
        .find_project(project)?
        .ok_or_else(|| ForgeError::NotFound(format!("Project '{}'", project)))?;
    let files = db.load_files(record.id)?;
    if files.is_empty() {
        return Err(ForgeError::NotFound(format!(
            "No generated files for project '{}'",
            project
        )));
    }

    let written = export_files(&files, out)?;
    Output::new().success(&format!("Wrote {} files to {}", written.len(), out.display()));
    Ok(())
}
