//! TOML-based configuration for deep-research
//!
//! Every section and field has a default, so a missing or empty
//! `deep-research.toml` yields a working local setup (Ollama on localhost,
//! qwen3 models, three search iterations, five drafts).
//!
//! ```toml
//! [provider]
//! type = "ollama"
//! base_url = "http://localhost:11434"
//!
//! [models]
//! research = "qwen3:8b"
//! writing = "qwen3:14b"
//!
//! [research]
//! max_attempts = 5
//! max_iterations = 3
//! draft_count = 5
//! top_k = 3
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::Provider;
use crate::types::AppError;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "deep-research.toml";

/// Root configuration structure loaded from deep-research.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepResearchConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= Provider Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    OpenAI {
        /// Environment variable containing API key
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Ollama {
            base_url: default_ollama_url(),
        }
    }
}

// ============= Model Configuration =============

/// Which model each group of nodes talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Query planning, snippet summarization and review
    #[serde(default = "default_research_model")]
    pub research: String,

    /// Report drafting and candidate evaluation
    #[serde(default = "default_writing_model")]
    pub writing: String,
}

fn default_research_model() -> String {
    "qwen3:8b".to_string()
}

fn default_writing_model() -> String {
    "qwen3:14b".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            research: default_research_model(),
            writing: default_writing_model(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Generation attempts per structured call before falling back
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Planning passes before the review is forced to complete
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Candidate reports drafted in parallel
    #[serde(default = "default_draft_count")]
    pub draft_count: usize,

    /// Snippets summarized per search query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Snippet length in characters
    #[serde(default = "default_snippet_size")]
    pub snippet_size: usize,

    #[serde(default)]
    pub snippet_overlap: usize,

    /// Hits requested from the search engine per query
    #[serde(default = "default_search_results")]
    pub search_results: usize,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_max_iterations() -> u32 {
    3
}

fn default_draft_count() -> usize {
    5
}

fn default_top_k() -> usize {
    3
}

fn default_snippet_size() -> usize {
    5000
}

fn default_search_results() -> usize {
    10
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_iterations: default_max_iterations(),
            draft_count: default_draft_count(),
            top_k: default_top_k(),
            snippet_size: default_snippet_size(),
            snippet_overlap: 0,
            search_results: default_search_results(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl DeepResearchConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the file if it exists, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.as_ref().display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DeepResearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let research = &self.research;

        if research.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_attempts must be at least 1".to_string(),
            ));
        }
        if research.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_iterations must be at least 1".to_string(),
            ));
        }
        if research.draft_count == 0 {
            return Err(ConfigError::ValidationError(
                "research.draft_count must be at least 1".to_string(),
            ));
        }
        if research.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "research.top_k must be at least 1".to_string(),
            ));
        }
        if research.snippet_overlap >= research.snippet_size {
            return Err(ConfigError::ValidationError(format!(
                "research.snippet_overlap ({}) must be smaller than research.snippet_size ({})",
                research.snippet_overlap, research.snippet_size
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        if self.models.research.trim().is_empty() || self.models.writing.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "models.research and models.writing must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok()
    }

    /// Provider for the research-side nodes
    pub fn research_provider(&self) -> Result<Provider, ConfigError> {
        self.provider_for(&self.models.research)
    }

    /// Provider for drafting and evaluation
    pub fn writing_provider(&self) -> Result<Provider, ConfigError> {
        self.provider_for(&self.models.writing)
    }

    fn provider_for(&self, model: &str) -> Result<Provider, ConfigError> {
        match &self.provider {
            ProviderConfig::Ollama { base_url } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.to_string(),
            }),
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
            } => {
                let api_key = self
                    .resolve_env(api_key_env)
                    .ok_or_else(|| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.to_string(),
                })
            }
        }
    }
}
