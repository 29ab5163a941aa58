//! Provider module for MCP Bot
//!
//! This module contains the provider abstraction and the two vendor
//! implementations: OpenAI (chat-completion style) and Gemini
//! (generate-content style).

pub mod base;
pub mod gemini;
pub mod openai;

pub use base::{Message, ModelOption, Provider, ProviderKind, Role, NO_RESPONSE_FALLBACK};
pub use gemini::{flatten_history, GeminiProvider};
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a provider instance for the given vendor
///
/// # Arguments
///
/// * `kind` - Which vendor transport to build
/// * `config` - Provider endpoint configuration
/// * `api_key` - User-supplied API key
/// * `model` - Model identifier
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized
///
/// # Examples
///
/// ```
/// use mcpbot::config::ProviderConfig;
/// use mcpbot::providers::{create_provider, ProviderKind};
///
/// let provider = create_provider(
///     ProviderKind::Gemini,
///     &ProviderConfig::default(),
///     "key",
///     "gemini-1.5-flash",
/// )
/// .unwrap();
/// assert_eq!(provider.kind(), ProviderKind::Gemini);
/// ```
pub fn create_provider(
    kind: ProviderKind,
    config: &ProviderConfig,
    api_key: &str,
    model: &str,
) -> Result<Box<dyn Provider>> {
    match kind {
        ProviderKind::OpenAi => Ok(Box::new(OpenAiProvider::new(
            &config.openai,
            api_key,
            model,
        )?)),
        ProviderKind::Gemini => Ok(Box::new(GeminiProvider::new(
            &config.gemini,
            api_key,
            model,
        )?)),
    }
}
