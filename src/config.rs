//! Configuration management for MCP Bot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! The API key, active provider and model are not part of this file; they
//! are user state and live in the key-value store (see [`crate::storage`]).

use crate::error::{McpbotError, Result};
use crate::providers::ProviderKind;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for MCP Bot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider endpoints and the initial provider selection
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Key-value store location
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat presentation settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider selected when nothing has been stored yet
    #[serde(rename = "type", default)]
    pub provider_type: ProviderKind,

    /// OpenAI endpoint settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Gemini endpoint settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderKind::default(),
            openai: OpenAiConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Base URL for the chat-completions API (useful for tests and proxies)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for the generative-language API
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: default_gemini_api_base(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the key-value store; defaults to the platform data dir
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Chat presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Name the assistant introduces itself with in welcome messages
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

fn default_assistant_name() -> String {
    "MCP Bot".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used and a warning is
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| McpbotError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| McpbotError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider) = std::env::var("MCPBOT_PROVIDER") {
            match provider.parse() {
                Ok(kind) => self.provider.provider_type = kind,
                Err(_) => tracing::warn!("Invalid MCPBOT_PROVIDER: {}", provider),
            }
        }

        if let Ok(api_base) = std::env::var("MCPBOT_OPENAI_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: MCPBOT_OPENAI_API_BASE");
            self.provider.openai.api_base = api_base;
        }

        if let Ok(api_base) = std::env::var("MCPBOT_GEMINI_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: MCPBOT_GEMINI_API_BASE");
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(path) = std::env::var("MCPBOT_STORAGE") {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }
    }

    /// Resolve the key-value store directory
    ///
    /// # Errors
    ///
    /// Returns error if no explicit path is configured and the platform data
    /// directory cannot be determined
    pub fn storage_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.storage.path {
            return Ok(path.clone());
        }

        let proj_dirs = ProjectDirs::from("com", "mcpbot", "mcpbot")
            .ok_or_else(|| McpbotError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join("store"))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        validate_api_base("provider.openai.api_base", &self.provider.openai.api_base)?;
        validate_api_base("provider.gemini.api_base", &self.provider.gemini.api_base)?;

        if self.chat.assistant_name.trim().is_empty() {
            return Err(
                McpbotError::Config("chat.assistant_name cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

fn validate_api_base(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(McpbotError::Config(format!("{} cannot be empty", field)).into());
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(McpbotError::Config(format!(
            "{} must start with http:// or https://, got: {}",
            field, value
        ))
        .into());
    }
    Ok(())
}
