//! Error types for MCP Bot
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for MCP Bot operations
///
/// Covers configuration problems, the uninitialized-adapter condition,
/// provider transport failures, session lookups, and storage errors.
#[derive(Error, Debug)]
pub enum McpbotError {
    /// Configuration-related errors (bad config file, unusable API key, unknown provider)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A message was sent before any provider transport was configured
    #[error("No AI provider initialized. Please set your API key.")]
    Uninitialized,

    /// Transport-level failure reported by a provider
    ///
    /// The display form is qualified by the provider name so callers can
    /// tell which backend failed.
    #[error("{provider} Error: {message}")]
    Provider {
        /// Display name of the failing provider ("OpenAI", "Gemini")
        provider: String,
        /// Underlying error detail
        message: String,
    },

    /// Session lookup by id failed
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl McpbotError {
    /// Build a provider-qualified transport error
    ///
    /// # Examples
    ///
    /// ```
    /// use mcpbot::error::McpbotError;
    ///
    /// let err = McpbotError::provider("OpenAI", "invalid api key");
    /// assert_eq!(err.to_string(), "OpenAI Error: invalid api key");
    /// ```
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for MCP Bot operations
///
/// Uses `anyhow::Error` so callers can attach context while still
/// downcasting to [`McpbotError`] where the variant matters.
pub type Result<T> = anyhow::Result<T>;
