//! Generate Command
//!
//! Generate, review and refactor the project files for a plan.

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, read_json};
use crate::service::GenerateRequest;
use crate::storage::{ProjectStore, export_files};
use crate::types::Result;

pub struct GenerateOptions {
    pub plan: PathBuf,
    pub spec: PathBuf,
    pub project: Option<String>,
    pub out: Option<PathBuf>,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();

    // Files are only kept in the database, so export needs a project
    let project = options.project.unwrap_or_else(|| "default".to_string());
    let project_id = ctx.ensure_project(&project, None)?;

    let response = ctx
        .service()
        .generate(GenerateRequest {
            plan: Some(read_json(&options.plan)?),
            refined_spec: Some(read_json(&options.spec)?),
            project_id: Some(project_id),
        })
        .await?;

    output.files(&response.files);
    output.review(&response.review, response.review_fallback);
    output.info(&response.refactor_message);

    if let Some(out) = &options.out {
        let files = ctx.db.load_files(project_id)?;
        let written = export_files(&files, out)?;
        output.success(&format!("Wrote {} files to {}", written.len(), out.display()));
    } else {
        output.success(&format!(
            "Generated {} files for '{}' (sysforge export {} --out <dir>)",
            response.total_files, project, project
        ));
    }
    Ok(())
}
