//! Refactorer
//!
//! Acts on a review at most once. High scores and issue-free reviews are
//! trusted as-is; otherwise each critical file present in the set is sent
//! back to the model with the first few issues. A failed rewrite keeps the
//! original file.

use crate::ai::{InvokeOptions, SharedModel, strip_code_fence};
use crate::config::GenerationConfig;
use crate::types::{EXCELLENT_SCORE, FileSet, RefactorOutcome, RefactorStatus, Result, ReviewVerdict};

use super::prompts;

pub const EXCELLENT_MESSAGE: &str = "Code quality excellent, no refactoring needed";
pub const NO_ISSUES_MESSAGE: &str = "No critical issues to refactor";

pub struct Refactorer {
    model: SharedModel,
    config: GenerationConfig,
}

impl Refactorer {
    pub fn new(model: SharedModel, config: GenerationConfig) -> Self {
        Self { model, config }
    }

    /// Only a missing backend is an error; every other failure leaves the
    /// affected file unchanged.
    pub async fn refactor(&self, files: FileSet, verdict: &ReviewVerdict) -> Result<RefactorOutcome> {
        if verdict.overall_score >= EXCELLENT_SCORE {
            tracing::info!("Refactorer: Score {} needs no refactoring", verdict.overall_score);
            return Ok(RefactorOutcome {
                files,
                message: EXCELLENT_MESSAGE.to_string(),
                status: RefactorStatus::SkippedExcellent,
            });
        }

        let issues = verdict.combined_issues();
        if issues.is_empty() {
            tracing::info!("Refactorer: Review listed no security or quality issues");
            return Ok(RefactorOutcome {
                files,
                message: NO_ISSUES_MESSAGE.to_string(),
                status: RefactorStatus::SkippedNoIssues,
            });
        }

        let issues = &issues[..issues.len().min(self.config.refactor_max_issues)];
        let options = InvokeOptions::default().with_max_output_tokens(self.config.file_max_tokens);

        let mut refactored = files.clone();
        let mut attempted = 0;
        let mut rewritten = 0;

        for name in &self.config.critical_files {
            let Some(source) = files.get(name) else {
                continue;
            };
            attempted += 1;

            tracing::info!("Refactorer: Rewriting {} for {} issues", name, issues.len());
            let prompt = prompts::refactor(issues, source, self.config.refactor_max_source_chars);

            match self.model.invoke(&prompt, options).await {
                Ok(answer) => {
                    refactored.insert(name.as_str(), strip_code_fence(&answer));
                    rewritten += 1;
                }
                Err(e) if e.is_configuration() => return Err(e),
                Err(e) => {
                    tracing::error!("Refactorer: Refactoring failed for {}: {}", name, e);
                }
            }
        }

        Ok(RefactorOutcome {
            message: format!("Refactored {} files", refactored.len()),
            files: refactored,
            status: RefactorStatus::Refactored { attempted, rewritten },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::invoke::test_support::{Reply, ScriptedProvider, scripted_client};
    use crate::types::{ErrorCategory, ReviewFallbackPolicy};

    fn files() -> FileSet {
        let mut files = FileSet::new();
        files.insert("app.py", "print(1)");
        files.insert("index.html", "<html></html>");
        files.insert("README.md", "# App");
        files
    }

    fn verdict(score: u8, security: &[&str], quality: &[&str]) -> ReviewVerdict {
        ReviewVerdict {
            overall_score: score,
            security_issues: security.iter().map(|s| s.to_string()).collect(),
            quality_issues: quality.iter().map(|s| s.to_string()).collect(),
            ..ReviewVerdict::fallback("", ReviewFallbackPolicy::Optimistic)
        }
    }

    #[tokio::test]
    async fn test_excellent_score_makes_no_calls() {
        let (model, provider) = scripted_client(ScriptedProvider::texts(["unused"]));

        let outcome = Refactorer::new(model, GenerationConfig::default())
            .refactor(files(), &verdict(90, &["XSS"], &[]))
            .await
            .unwrap();

        assert_eq!(outcome.files, files());
        assert_eq!(outcome.message, EXCELLENT_MESSAGE);
        assert_eq!(outcome.status, RefactorStatus::SkippedExcellent);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_issues_makes_no_calls() {
        let (model, provider) = scripted_client(ScriptedProvider::texts(["unused"]));

        let outcome = Refactorer::new(model, GenerationConfig::default())
            .refactor(files(), &verdict(40, &[], &[]))
            .await
            .unwrap();

        assert_eq!(outcome.files, files());
        assert_eq!(outcome.message, NO_ISSUES_MESSAGE);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_low_score_rewrites_both_critical_files() {
        let (model, provider) = scripted_client(ScriptedProvider::texts([
            "```python\nprint(2)\n```",
            "<html>v2</html>",
        ]));

        let outcome = Refactorer::new(model, GenerationConfig::default())
            .refactor(files(), &verdict(40, &[], &["No input validation"]))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(outcome.files.get("app.py"), Some("print(2)"));
        assert_eq!(outcome.files.get("index.html"), Some("<html>v2</html>"));
        assert_eq!(outcome.files.get("README.md"), Some("# App"));
        assert_eq!(outcome.message, "Refactored 3 files");
        assert_eq!(
            outcome.status,
            RefactorStatus::Refactored { attempted: 2, rewritten: 2 }
        );
        assert!(provider.requests()[0].prompt.contains("- No input validation"));
    }

    #[tokio::test]
    async fn test_failed_rewrite_keeps_original() {
        let (model, _) = scripted_client(ScriptedProvider::new(vec![
            Reply::Fail(ErrorCategory::Unavailable),
            Reply::Text("<html>v2</html>".to_string()),
        ]));

        let outcome = Refactorer::new(model, GenerationConfig::default())
            .refactor(files(), &verdict(30, &["XSS"], &[]))
            .await
            .unwrap();

        assert_eq!(outcome.files.get("app.py"), Some("print(1)"));
        assert_eq!(outcome.files.get("index.html"), Some("<html>v2</html>"));
        assert_eq!(
            outcome.status,
            RefactorStatus::Refactored { attempted: 2, rewritten: 1 }
        );
    }

    #[tokio::test]
    async fn test_only_present_critical_files_are_sent() {
        let (model, provider) = scripted_client(ScriptedProvider::texts(["print(3)"]));
        let mut only_backend = FileSet::new();
        only_backend.insert("app.py", "print(1)");

        let outcome = Refactorer::new(model, GenerationConfig::default())
            .refactor(only_backend, &verdict(10, &["SQL injection"], &[]))
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert_eq!(outcome.message, "Refactored 1 files");
    }

    #[tokio::test]
    async fn test_issue_list_is_capped() {
        let (model, provider) = scripted_client(ScriptedProvider::texts(["a", "b"]));
        let issues = ["i1", "i2", "i3", "i4", "i5", "i6", "i7"];

        Refactorer::new(model, GenerationConfig::default())
            .refactor(files(), &verdict(20, &issues[..3], &issues[3..]))
            .await
            .unwrap();

        let prompt = &provider.requests()[0].prompt;
        assert!(prompt.contains("- i5"));
        assert!(!prompt.contains("- i6"));
    }
}
