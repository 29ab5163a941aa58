//! Command-line interface definition for MCP Bot
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, one-shot sends, provider configuration,
//! session management, and the model catalog.

use crate::providers::ProviderKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MCP Bot - terminal chat client for hosted LLM providers
///
/// Converse with OpenAI or Gemini models; conversations are kept in a
/// local store and resumed across runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "mcpbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory of the local key-value store
    #[arg(long, env = "MCPBOT_STORAGE")]
    pub storage_path: Option<PathBuf>,

    /// Command to execute; interactive chat when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for MCP Bot
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Resume this session instead of the last active one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Send one message to the active session and print the reply
    Send {
        /// Message text
        text: String,
    },

    /// Set the provider and API key
    Configure {
        /// Provider (openai, gemini)
        #[arg(short, long)]
        provider: ProviderKind,

        /// API key for the provider
        #[arg(short = 'k', long)]
        api_key: String,

        /// Model identifier; the provider default when omitted
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage conversation sessions
    Sessions {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// List available models
    Models {
        /// Only list models for this provider (openai, gemini)
        #[arg(short, long)]
        provider: Option<ProviderKind>,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List all sessions, newest first
    List,

    /// Start a new session and make it active
    New,

    /// Print the messages of a session
    Show {
        /// Session id; the active session when omitted
        id: Option<String>,
    },

    /// Make a session active
    Select {
        /// Session id
        id: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: None,
        }
    }
}
