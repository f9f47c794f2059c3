//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/sysforge/) and project (.sysforge/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::ProviderConfig;
use crate::constants;
use crate::types::{ForgeError, ReviewFallbackPolicy, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// File generation and refactoring settings
    pub generation: GenerationConfig,

    /// Code review settings
    pub review: ReviewConfig,

    /// Stage sequencing settings
    pub pipeline: PipelineConfig,

    /// Project store settings
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            generation: GenerationConfig::default(),
            review: ReviewConfig::default(),
            pipeline: PipelineConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForgeError::Settings` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.llm.provider.as_str(), "gemini" | "openai") {
            return Err(ForgeError::Settings(format!(
                "Unknown LLM provider '{}'. Supported: gemini, openai",
                self.llm.provider
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ForgeError::Settings(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        let generation = &self.generation;
        if generation.backend_file.trim().is_empty() || generation.ui_file.trim().is_empty() {
            return Err(ForgeError::Settings(
                "generation.backend_file and generation.ui_file must not be empty".to_string(),
            ));
        }
        if generation.backend_file == generation.ui_file {
            return Err(ForgeError::Settings(format!(
                "generation.backend_file and generation.ui_file must differ (both '{}')",
                generation.backend_file
            )));
        }
        if generation.file_max_tokens == 0 {
            return Err(ForgeError::Settings(
                "generation.file_max_tokens must be greater than 0".to_string(),
            ));
        }
        if generation.refactor_max_issues == 0 {
            return Err(ForgeError::Settings(
                "generation.refactor_max_issues must be greater than 0".to_string(),
            ));
        }
        if generation.refactor_max_source_chars == 0 {
            return Err(ForgeError::Settings(
                "generation.refactor_max_source_chars must be greater than 0".to_string(),
            ));
        }

        if self.review.plan_excerpt_chars == 0 {
            return Err(ForgeError::Settings(
                "review.plan_excerpt_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "gemini" or "openai"
    pub provider: String,

    /// Model name; provider default when unset
    pub model: Option<String>,

    /// Custom API base URL
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// API key. Prefer the provider's environment variable
    /// (`GEMINI_KEY`, `OPENAI_API_KEY`); never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            api_base: None,
            timeout_secs: constants::network::DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Filename of the model-generated backend
    pub backend_file: String,

    /// Filename of the model-generated interface
    pub ui_file: String,

    /// Files the refactorer may rewrite, in order
    pub critical_files: Vec<String>,

    /// Output token budget for each generated or refactored file
    pub file_max_tokens: u32,

    /// Combined review issues included in each refactor prompt
    pub refactor_max_issues: usize,

    /// Characters of the original file included in each refactor prompt
    pub refactor_max_source_chars: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend_file: "app.py".to_string(),
            ui_file: "index.html".to_string(),
            critical_files: vec!["app.py".to_string(), "index.html".to_string()],
            file_max_tokens: constants::generate::FILE_MAX_TOKENS,
            refactor_max_issues: constants::refactor::MAX_ISSUES,
            refactor_max_source_chars: constants::refactor::MAX_SOURCE_CHARS,
        }
    }
}

// =============================================================================
// Review Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Verdict reported when the reviewer's answer can't be parsed
    pub fallback_policy: ReviewFallbackPolicy,

    /// Characters of the pretty-printed plan shown to the reviewer
    pub plan_excerpt_chars: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            fallback_policy: ReviewFallbackPolicy::default(),
            plan_excerpt_chars: constants::review::PLAN_EXCERPT_CHARS,
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stop with an error when the refiner or composer falls back,
    /// instead of generating files from a placeholder
    pub halt_on_fallback: bool,
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path (relative paths resolve against the working directory)
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".sysforge").join("sysforge.db"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
