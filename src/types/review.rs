//! Review verdict and refactor outcome.

use serde::{Deserialize, Serialize};

use super::fileset::FileSet;
use super::utils::{lenient, truncate_chars};

/// Score at or above which the refactorer trusts the review and does nothing
pub const EXCELLENT_SCORE: u8 = 90;

/// Characters of raw review text kept as the fallback summary
pub const FALLBACK_SUMMARY_CHARS: usize = 500;

/// What the reviewer reports when the model's answer can't be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFallbackPolicy {
    /// Passing score (75) and deployable; never blocks delivery
    #[default]
    Optimistic,
    /// Middling score (50) and not deployable
    Conservative,
}

impl ReviewFallbackPolicy {
    pub fn score(&self) -> u8 {
        match self {
            Self::Optimistic => 75,
            Self::Conservative => 50,
        }
    }

    pub fn deployment_ready(&self) -> bool {
        matches!(self, Self::Optimistic)
    }
}

impl std::fmt::Display for ReviewFallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimistic => write!(f, "optimistic"),
            Self::Conservative => write!(f, "conservative"),
        }
    }
}

impl std::str::FromStr for ReviewFallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "conservative" => Ok(Self::Conservative),
            _ => Err(format!(
                "Unknown review fallback policy: {}. Valid values: optimistic, conservative",
                s
            )),
        }
    }
}

fn default_score() -> u8 {
    100
}

/// Structured verdict produced by the code reviewer.
///
/// A decoded answer without `overall_score` counts as 100, so the
/// refactorer leaves the files alone. A score that is present but
/// unreadable counts as 0 and keeps every issue the model listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    #[serde(default = "default_score", deserialize_with = "lenient::score")]
    pub overall_score: u8,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub security_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub quality_issues: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub missing_features: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub deployment_ready: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    /// Unparsed model answer, kept for audit when structured parsing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_review: Option<String>,
}

impl ReviewVerdict {
    /// Placeholder verdict for an unparseable review
    pub fn fallback(raw: &str, policy: ReviewFallbackPolicy) -> Self {
        Self {
            overall_score: policy.score(),
            security_issues: Vec::new(),
            quality_issues: Vec::new(),
            missing_features: Vec::new(),
            recommendations: vec!["Review code manually".to_string()],
            deployment_ready: policy.deployment_ready(),
            summary: truncate_chars(raw, FALLBACK_SUMMARY_CHARS).to_string(),
            raw_review: Some(raw.to_string()),
        }
    }

    /// Security issues followed by quality issues
    pub fn combined_issues(&self) -> Vec<&str> {
        self.security_issues
            .iter()
            .chain(self.quality_issues.iter())
            .map(String::as_str)
            .collect()
    }
}

/// How the refactorer finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RefactorStatus {
    /// Score high enough to trust without another model call
    SkippedExcellent,
    /// No security or quality issues to act on
    SkippedNoIssues,
    /// Critical files were sent back to the model
    Refactored { attempted: usize, rewritten: usize },
}

/// Final file set plus a human-readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorOutcome {
    pub files: FileSet,
    pub message: String,
    pub status: RefactorStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_string_score_and_flag() {
        let raw = r#"{"overall_score": "82", "deployment_ready": "yes", "quality_issues": "No tests"}"#;
        let verdict: ReviewVerdict = serde_json::from_str(raw).unwrap();
        assert_eq!(verdict.overall_score, 82);
        assert!(verdict.deployment_ready);
        assert_eq!(verdict.quality_issues, vec!["No tests"]);
    }

    #[test]
    fn test_missing_score_counts_as_perfect() {
        let verdict: ReviewVerdict = serde_json::from_str(r#"{"summary": "fine"}"#).unwrap();
        assert_eq!(verdict.overall_score, 100);
    }

    #[test]
    fn test_odd_score_keeps_the_rest_of_the_verdict() {
        let raw = r#"{"overall_score": "N/A", "security_issues": ["SQL injection in /login"]}"#;
        let verdict: ReviewVerdict = serde_json::from_str(raw).unwrap();
        assert_eq!(verdict.overall_score, 0);
        assert_eq!(verdict.security_issues, vec!["SQL injection in /login"]);
    }

    #[test]
    fn test_score_is_clamped() {
        let verdict: ReviewVerdict = serde_json::from_str(r#"{"overall_score": 130.4}"#).unwrap();
        assert_eq!(verdict.overall_score, 100);
    }

    #[test]
    fn test_fallback_policies() {
        let raw = "r".repeat(800);
        let optimistic = ReviewVerdict::fallback(&raw, ReviewFallbackPolicy::Optimistic);
        assert_eq!(optimistic.overall_score, 75);
        assert!(optimistic.deployment_ready);
        assert_eq!(optimistic.summary.len(), FALLBACK_SUMMARY_CHARS);
        assert!(optimistic.combined_issues().is_empty());

        let conservative = ReviewVerdict::fallback(&raw, ReviewFallbackPolicy::Conservative);
        assert_eq!(conservative.overall_score, 50);
        assert!(!conservative.deployment_ready);
    }

    #[test]
    fn test_combined_issues_order() {
        let verdict = ReviewVerdict {
            security_issues: vec!["sql injection".into()],
            quality_issues: vec!["no tests".into()],
            ..ReviewVerdict::fallback("", ReviewFallbackPolicy::Optimistic)
        };
        assert_eq!(verdict.combined_issues(), vec!["sql injection", "no tests"]);
    }
}
