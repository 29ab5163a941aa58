//! Provider client adapter
//!
//! [`ProviderClient`] holds at most one live provider transport and exposes
//! the single outbound operation, [`ProviderClient::send_message`]. Provider
//! selection is the only state it keeps between calls.

use crate::config::ProviderConfig;
use crate::error::{McpbotError, Result};
use crate::providers::{create_provider, Message, Provider, ProviderKind};

/// Adapter normalizing both vendor APIs behind one `send_message` contract
///
/// # Examples
///
/// ```no_run
/// use mcpbot::client::ProviderClient;
/// use mcpbot::config::ProviderConfig;
/// use mcpbot::providers::{Message, ProviderKind};
///
/// # async fn example() -> mcpbot::error::Result<()> {
/// let mut client = ProviderClient::new(ProviderConfig::default());
/// client.initialize(ProviderKind::OpenAi, "sk-...", "gpt-4o")?;
/// let reply = client.send_message(&[Message::user("Hello")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct ProviderClient {
    config: ProviderConfig,
    provider: Option<Box<dyn Provider>>,
}

impl ProviderClient {
    /// Create an uninitialized client
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    /// Configure the live transport, discarding any previous one
    ///
    /// An empty `model` selects the provider's default model.
    ///
    /// # Errors
    ///
    /// Returns [`McpbotError::Config`] if the API key is empty, or if the
    /// HTTP client cannot be built. The previous transport is kept in that case.
    pub fn initialize(&mut self, kind: ProviderKind, api_key: &str, model: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(McpbotError::Config("API key cannot be empty".to_string()).into());
        }

        let model = match model.trim() {
            "" => kind.default_model(),
            m => m,
        };

        let provider = create_provider(kind, &self.config, api_key, model)?;
        self.install(provider);
        Ok(())
    }

    /// Replace the live transport with an already built provider
    pub fn install(&mut self, provider: Box<dyn Provider>) {
        tracing::debug!(
            "Installing {} transport with model {}",
            provider.kind(),
            provider.model()
        );
        self.provider = Some(provider);
    }

    /// Discard the live transport
    pub fn reset(&mut self) {
        if self.provider.take().is_some() {
            tracing::debug!("Discarded provider transport");
        }
    }

    /// Send the full history through the live transport
    ///
    /// # Errors
    ///
    /// Returns [`McpbotError::Uninitialized`] if no transport is configured,
    /// otherwise whatever provider-qualified error the transport reports.
    pub async fn send_message(&self, history: &[Message]) -> Result<String> {
        let provider = self.provider.as_ref().ok_or(McpbotError::Uninitialized)?;
        provider.send_message(history).await
    }

    /// Whether a transport is configured
    pub fn is_initialized(&self) -> bool {
        self.provider.is_some()
    }

    /// Provider family of the live transport
    pub fn current_provider(&self) -> Option<ProviderKind> {
        self.provider.as_ref().map(|p| p.kind())
    }

    /// Model of the live transport
    pub fn current_model(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.model())
    }

    /// Change the model of the live transport without re-keying
    ///
    /// # Errors
    ///
    /// Returns [`McpbotError::Uninitialized`] if no transport is configured
    pub fn update_model(&mut self, model: &str) -> Result<()> {
        let provider = self.provider.as_mut().ok_or(McpbotError::Uninitialized)?;
        provider.set_model(model.to_string());
        Ok(())
    }
}
