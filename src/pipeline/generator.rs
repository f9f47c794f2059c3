//! File Generator
//!
//! Two model calls, backend then interface, each cleaned of its code fence.
//! Either call failing aborts generation: a project without its primary
//! source is worthless. Supporting files come from [`super::scaffold`].

use crate::ai::{InvokeOptions, SharedModel, strip_code_fence};
use crate::config::GenerationConfig;
use crate::types::{FileSet, ImplementationPlan, RefinedSpecification, Result};

use super::{prompts, scaffold};

pub struct FileGenerator {
    model: SharedModel,
    config: GenerationConfig,
}

impl FileGenerator {
    pub fn new(model: SharedModel, config: GenerationConfig) -> Self {
        Self { model, config }
    }

    pub async fn generate(
        &self,
        plan: &ImplementationPlan,
        spec: &RefinedSpecification,
    ) -> Result<FileSet> {
        let plan_json = prompts::plan_json(plan);
        let spec_json = prompts::spec_json(spec);
        let options = InvokeOptions::default().with_max_output_tokens(self.config.file_max_tokens);

        let mut files = FileSet::new();

        tracing::info!("Generator: Writing {}", self.config.backend_file);
        let backend = self
            .model
            .invoke(
                &prompts::backend(&self.config.backend_file, &plan_json, &spec_json),
                options,
            )
            .await?;
        files.insert(self.config.backend_file.as_str(), strip_code_fence(&backend));

        tracing::info!("Generator: Writing {}", self.config.ui_file);
        let interface = self
            .model
            .invoke(&prompts::interface(&plan_json, &spec_json), options)
            .await?;
        files.insert(self.config.ui_file.as_str(), strip_code_fence(&interface));

        scaffold::add_supporting_files(&mut files, spec, &self.config.backend_file);

        tracing::info!("Generator: {} files ready", files.len());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::invoke::test_support::{Reply, ScriptedProvider, scripted_client};
    use crate::types::{ErrorCategory, ForgeError};

    fn spec() -> RefinedSpecification {
        RefinedSpecification {
            goal: "Homework tracker".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generates_six_files_with_fences_stripped() {
        let (model, provider) = scripted_client(ScriptedProvider::texts([
            "```python\nprint(1)\n```",
            "```html\n<html></html>\n```",
        ]));

        let files = FileGenerator::new(model, GenerationConfig::default())
            .generate(&ImplementationPlan::default(), &spec())
            .await
            .unwrap();

        assert_eq!(files.get("app.py"), Some("print(1)"));
        assert_eq!(files.get("index.html"), Some("<html></html>"));
        assert_eq!(files.len(), 6);
        for name in ["requirements.txt", "vercel.json", "README.md", ".env.example"] {
            assert!(files.contains(name), "missing {}", name);
        }

        assert_eq!(provider.call_count(), 2);
        assert!(provider.requests().iter().all(|r| r.max_output_tokens == 8000));
    }

    #[tokio::test]
    async fn test_backend_failure_aborts() {
        let (model, provider) = scripted_client(ScriptedProvider::new(vec![Reply::Fail(
            ErrorCategory::RateLimit,
        )]));

        let err = FileGenerator::new(model, GenerationConfig::default())
            .generate(&ImplementationPlan::default(), &spec())
            .await
            .unwrap_err();

        assert!(matches!(err, ForgeError::Upstream(_)));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_interface_failure_aborts() {
        let (model, _) = scripted_client(ScriptedProvider::new(vec![
            Reply::Text("print(1)".to_string()),
            Reply::Fail(ErrorCategory::Unavailable),
        ]));

        let result = FileGenerator::new(model, GenerationConfig::default())
            .generate(&ImplementationPlan::default(), &spec())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_filenames() {
        let config = GenerationConfig {
            backend_file: "server.py".to_string(),
            ui_file: "public/index.html".to_string(),
            ..Default::default()
        };
        let (model, _) = scripted_client(ScriptedProvider::texts(["a", "b"]));

        let files = FileGenerator::new(model, config)
            .generate(&ImplementationPlan::default(), &spec())
            .await
            .unwrap();

        assert_eq!(files.get("server.py"), Some("a"));
        assert_eq!(files.get("public/index.html"), Some("b"));
        assert!(files.get("vercel.json").unwrap().contains("\"server.py\""));
    }
}
