//! Base provider trait and common types for MCP Bot
//!
//! This module defines the [`Provider`] trait that both vendor transports
//! implement, along with the conversation [`Message`] type, the [`Role`]
//! enum, and the [`ProviderKind`] selector with its model catalog.

use crate::error::{McpbotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text returned when a provider answers with an empty envelope
pub const NO_RESPONSE_FALLBACK: &str = "No response received";

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user
    User,
    /// Message produced by the model (or a synthetic error reply)
    Assistant,
    /// Instruction message; forwarded to chat-completion providers only
    System,
}

impl Role {
    /// Wire name of the role ("user", "assistant", "system")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message structure for conversation
///
/// Messages are immutable once created and ordered by append order.
/// The `id` is derived from the creation time in milliseconds, so two
/// messages created within the same millisecond share an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Timestamp-derived identifier
    pub id: String,
    /// Role of the message author
    pub role: Role,
    /// Message text
    pub text: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a new message stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use mcpbot::providers::{Message, Role};
    ///
    /// let msg = Message::new(Role::User, "Hello");
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.id, msg.timestamp.timestamp_millis().to_string());
    /// ```
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: timestamp.timestamp_millis().to_string(),
            role,
            text: text.into(),
            timestamp,
        }
    }

    /// Creates a new user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates a new assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Creates a new system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }
}

/// A selectable model entry in a provider's catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    /// Model identifier sent on the wire
    pub id: &'static str,
    /// Human readable label
    pub label: &'static str,
}

const OPENAI_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gpt-4.1-2025-04-14",
        label: "GPT-4.1 (Flagship)",
    },
    ModelOption {
        id: "o3-2025-04-16",
        label: "O3 (Reasoning)",
    },
    ModelOption {
        id: "o4-mini-2025-04-16",
        label: "O4 Mini (Fast)",
    },
    ModelOption {
        id: "gpt-4.1-mini-2025-04-14",
        label: "GPT-4.1 Mini",
    },
    ModelOption {
        id: "gpt-4o",
        label: "GPT-4o",
    },
];

const GEMINI_MODELS: &[ModelOption] = &[
    ModelOption {
        id: "gemini-1.5-pro",
        label: "Gemini 1.5 Pro",
    },
    ModelOption {
        id: "gemini-1.5-flash",
        label: "Gemini 1.5 Flash",
    },
    ModelOption {
        id: "gemini-1.0-pro",
        label: "Gemini 1.0 Pro",
    },
];

/// The two supported provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat-completions API
    #[default]
    OpenAi,
    /// Google Gemini generate-content API
    Gemini,
}

impl ProviderKind {
    /// All supported providers, in display order
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Gemini];

    /// Identifier used in configuration and storage ("openai", "gemini")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Name used in user-facing text and provider-qualified errors
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }

    /// Model selected when switching to this provider
    ///
    /// # Examples
    ///
    /// ```
    /// use mcpbot::providers::ProviderKind;
    ///
    /// assert_eq!(ProviderKind::OpenAi.default_model(), "gpt-4.1-2025-04-14");
    /// assert_eq!(ProviderKind::Gemini.default_model(), "gemini-1.5-pro");
    /// ```
    pub fn default_model(&self) -> &'static str {
        self.models()[0].id
    }

    /// Model catalog for this provider; the first entry is the default
    pub fn models(&self) -> &'static [ModelOption] {
        match self {
            Self::OpenAi => OPENAI_MODELS,
            Self::Gemini => GEMINI_MODELS,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = McpbotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(McpbotError::Config(format!(
                "Unknown provider: {}. Must be one of: openai, gemini",
                other
            ))),
        }
    }
}

/// Provider trait for AI providers
///
/// One implementation exists per vendor. An implementation is selected once,
/// when the adapter is initialized, and then used for every request until it
/// is replaced.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Sends the full conversation history and returns the reply text
    ///
    /// # Errors
    ///
    /// Returns a provider-qualified [`McpbotError::Provider`] when the
    /// transport fails or the envelope cannot be decoded. An envelope
    /// without text is not an error; [`NO_RESPONSE_FALLBACK`] is returned.
    async fn send_message(&self, history: &[Message]) -> Result<String>;

    /// Which provider family this transport talks to
    fn kind(&self) -> ProviderKind;

    /// Currently selected model
    fn model(&self) -> &str;

    /// Switch the model used for subsequent requests
    fn set_model(&mut self, model: String);
}

/// Extract a readable detail from a failed HTTP response body
///
/// Both vendors wrap failures as `{"error": {"message": "..."}}`; anything
/// else falls back to the status line and raw body.
pub(crate) fn api_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            format!("{} {}", status.as_u16(), envelope.error.message)
        }
        _ if body.trim().is_empty() => status.to_string(),
        _ => format!("{}: {}", status, body.trim()),
    }
}
