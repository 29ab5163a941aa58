//! MCP Bot - terminal chat client library
//!
//! This library provides the core of MCP Bot: a provider adapter that puts
//! the OpenAI and Gemini APIs behind one `send_message` contract, and a
//! session store that mirrors every conversation to a local key-value store.
//!
//! # Architecture
//!
//! - `client`: Provider adapter holding the live transport
//! - `providers`: Provider trait, message types, and vendor implementations
//! - `session`: Sessions, title derivation, and the persisted session list
//! - `storage`: Embedded key-value store and persisted provider settings
//! - `app`: Chat application core tying the pieces together
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use mcpbot::{ChatApp, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut app = ChatApp::open(config)?;
//!     app.send_message("Hello!").await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use app::{ChatApp, SendOutcome};
pub use client::ProviderClient;
pub use config::Config;
pub use error::{McpbotError, Result};
pub use providers::{Message, ProviderKind, Role};
pub use session::{Session, SessionStore};

#[cfg(test)]
pub mod test_utils;
