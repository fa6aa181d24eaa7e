//! # Application Configuration
//!
//! This module defines the configuration structure for the `litlens-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables. The configuration is built once at startup and passed
//! into the application state; nothing reads it from global state afterwards.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use litlens::{constants::DEFAULT_GEMINI_MODEL, ExtractionVariant, VerificationPolicy};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
    /// The selected AI provider has no credential. Startup must stop here.
    MissingCredential(String),
    /// A prompt override is present but blank.
    InvalidPrompt(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
            ConfigError::MissingCredential(var) => {
                write!(f, "Error: {var} is not set.")
            }
            ConfigError::InvalidPrompt(name) => {
                write!(f, "Configuration error: prompt override '{name}' is empty")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Optional replacements for the built-in prompt templates.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PromptOverrides {
    #[serde(default)]
    pub extraction: Option<String>,
    #[serde(default)]
    pub verification: Option<String>,
}

/// The root configuration structure.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The interface to bind. Loaded from `BIND_HOST`.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// The port for the server to listen on. Loaded from `PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Which gateway implementation to use ("gemini" or "local").
    #[serde(default = "default_ai_provider")]
    pub ai_provider: String,
    /// The Gemini credential. Loaded from `GEMINI_API_KEY`.
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Overrides the provider endpoint. Required for "local".
    #[serde(default)]
    pub ai_api_url: Option<String>,
    /// Optional bearer token for the "local" provider.
    #[serde(default)]
    pub ai_api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub extraction_variant: ExtractionVariant,
    /// Whether the second, verification pass runs.
    #[serde(default)]
    pub verification: VerificationPolicy,
    /// Optional request body limit for uploads, in bytes. Unlimited when unset.
    #[serde(default)]
    pub max_upload_bytes: Option<usize>,
    #[serde(default)]
    pub prompts: PromptOverrides,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_ai_provider() -> String {
    "gemini".to_string()
}

fn default_model_name() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            ai_provider: default_ai_provider(),
            gemini_api_key: None,
            ai_api_url: None,
            ai_api_key: None,
            model_name: default_model_name(),
            extraction_variant: ExtractionVariant::default(),
            verification: VerificationPolicy::default(),
            max_upload_bytes: None,
            prompts: PromptOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Checks everything that must hold before the server may start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.ai_provider.as_str() {
            "gemini" => {
                let has_key = self
                    .gemini_api_key
                    .as_deref()
                    .is_some_and(|k| !k.trim().is_empty());
                if !has_key {
                    return Err(ConfigError::MissingCredential("GEMINI_API_KEY".to_string()));
                }
            }
            "local" => {
                if self.ai_api_url.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::General(
                        "AI_API_URL is required for the local provider".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::General(format!(
                    "Unsupported AI provider: {other}"
                )))
            }
        }

        for (name, prompt) in [
            ("extraction", &self.prompts.extraction),
            ("verification", &self.prompts.verification),
        ] {
            if prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidPrompt(name.to_string()));
            }
        }

        Ok(())
    }
}

// Helper to read a file, substitute `${VAR}` references from the environment,
// and return its content. Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads and validates the application configuration.
///
/// Layers, lowest precedence first:
/// - defaults declared on `AppConfig`;
/// - a YAML file: `config_path_override` if given (it must exist), otherwise
///   `config.yml` in the working directory when present;
/// - plain environment variables for top-level keys (`PORT`, `GEMINI_API_KEY`, ...);
/// - `LITLENS_`-prefixed variables for nested keys (e.g. `LITLENS_PROMPTS__VERIFICATION`).
///
/// A missing credential is reported here, before anything starts listening.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let file_content = match config_path_override {
        Some(path) => Some(read_and_substitute(path)?.ok_or_else(|| {
            ConfigError::NotFound(format!("Config file not found at '{path}'."))
        })?),
        None => read_and_substitute("config.yml")?,
    };
    if let Some(content) = file_content {
        info!(
            path = config_path_override.unwrap_or("config.yml"),
            "Loading configuration file."
        );
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("LITLENS")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
