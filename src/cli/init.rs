//! Init command implementation
//!
//! Writes a commented `deep-research.toml` and an `.env.example`.

use super::output::Output;
use crate::utils::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// A configuration file is already present
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure (ollama or openai)
    pub provider: String,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing deep-research");

    if !matches!(config.provider.as_str(), "ollama" | "openai") {
        output.error(&format!(
            "Unknown provider '{}', expected 'ollama' or 'openai'",
            config.provider
        ));
        return InitResult::Error(format!("unknown provider {}", config.provider));
    }

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
    }

    let config_path = base_path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let toml_content = generate_config_toml(&config.provider);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", DEFAULT_CONFIG_FILE);

    let env_example_path = base_path.join(".env.example");
    match write_file(&env_example_path, &generate_env_example(), config.force) {
        Ok(true) => output.created("env", ".env.example"),
        Ok(false) => output.skipped(".env.example", "already exists"),
        Err(e) => {
            output.error(&format!("Failed to create .env.example: {}", e));
            return InitResult::Error(e.to_string());
        }
    }

    output.complete("deep-research initialized");

    output.header("Next Steps");
    if config.provider == "ollama" {
        output.info("Start Ollama and pull the default models:");
        output.command("ollama serve");
        output.command("ollama pull qwen3:8b && ollama pull qwen3:14b");
    } else {
        output.info("Set your API key:");
        output.command("cp .env.example .env  # then edit OPENAI_API_KEY");
    }
    output.info("Run a research query:");
    output.command("deep-research run \"What changed in the EU AI Act in 2025?\"");

    InitResult::Success
}

/// Returns false when an existing file was left alone.
fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    fs::write(path, content)?;
    Ok(true)
}

fn generate_config_toml(provider: &str) -> String {
    let provider_section = if provider == "openai" {
        r#"[provider]
type = "openai"
# Name of the environment variable holding the API key
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"

[models]
research = "gpt-4o-mini"
writing = "gpt-4o""#
    } else {
        r#"[provider]
type = "ollama"
base_url = "http://localhost:11434"

[models]
# Planning, summarizing and reviewing
research = "qwen3:8b"
# Drafting and evaluation
writing = "qwen3:14b""#
    };

    format!(
        r#"# deep-research configuration

{}

[research]
# Attempts per structured model call before falling back
max_attempts = 5
# Search/review passes before drafting is forced
max_iterations = 3
# Candidate reports written in parallel
draft_count = 5
# Snippets summarized per search query
top_k = 3
# Snippet length in characters
snippet_size = 5000
snippet_overlap = 0
# Hits requested per search query
search_results = 10

[logging]
# Overridden by RUST_LOG
level = "info"
# "pretty" or "json"
format = "pretty"
"#,
        provider_section
    )
}

fn generate_env_example() -> String {
    r#"# deep-research environment
# Copy to .env and fill in the values you need.

# Required when [provider] type = "openai"
OPENAI_API_KEY=

# Log filter, takes precedence over [logging] level
# RUST_LOG=deep_research=debug
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::ProviderConfig;
    use crate::utils::DeepResearchConfig;
    use tempfile::TempDir;

    fn init_config(temp_dir: &TempDir, provider: &str, force: bool) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
            provider: provider.to_string(),
        }
    }

    #[test]
    fn test_generated_ollama_config_is_valid() {
        let config = DeepResearchConfig::from_toml_str(&generate_config_toml("ollama"))
            .expect("generated config should parse");
        assert_eq!(config, DeepResearchConfig::default());
    }

    #[test]
    fn test_generated_openai_config_is_valid() {
        let config = DeepResearchConfig::from_toml_str(&generate_config_toml("openai"))
            .expect("generated config should parse");
        assert!(matches!(config.provider, ProviderConfig::OpenAI { .. }));
        assert_eq!(config.models.writing, "gpt-4o");
    }

    #[test]
    fn test_generate_env_example() {
        assert!(generate_env_example().contains("OPENAI_API_KEY="));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original").expect("Failed to write");

        assert!(!write_file(&file_path, "new content", false).unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");

        assert!(write_file(&file_path, "new content", true).unwrap());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_run_creates_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = run(init_config(&temp_dir, "ollama", false), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(temp_dir.path().join(DEFAULT_CONFIG_FILE).exists());
        assert!(temp_dir.path().join(".env.example").exists());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILE), "existing").unwrap();

        let result = run(init_config(&temp_dir, "ollama", false), &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);
    }

    #[test]
    fn test_run_force_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(DEFAULT_CONFIG_FILE), "existing").unwrap();

        let result = run(init_config(&temp_dir, "openai", true), &Output::no_color());
        assert_eq!(result, InitResult::Success);

        let content = fs::read_to_string(temp_dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert!(content.contains("type = \"openai\""));
        assert!(!content.contains("existing"));
    }

    #[test]
    fn test_run_rejects_unknown_provider() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = run(init_config(&temp_dir, "anthropic", false), &Output::no_color());
        assert!(matches!(result, InitResult::Error(_)));
        assert!(!temp_dir.path().join(DEFAULT_CONFIG_FILE).exists());
    }
}
