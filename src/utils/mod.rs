/// TOML configuration file loading and validation.
pub mod toml_config;

pub use toml_config::{DeepResearchConfig, DEFAULT_CONFIG_FILE};
