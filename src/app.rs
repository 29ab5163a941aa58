//! Chat application core
//!
//! [`ChatApp`] ties the provider adapter, the session store and the persisted
//! provider settings together. It implements the two user-facing verbs,
//! sending a message and setting an API key, plus the settings and session
//! actions the terminal surface exposes.

use crate::client::ProviderClient;
use crate::config::Config;
use crate::error::{McpbotError, Result};
use crate::providers::{Message, ProviderKind};
use crate::session::{welcome_text, Session, SessionStore};
use crate::storage::{keys, KvStore, StoredSettings};

/// Result of a non-empty send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider replied with this text
    Replied(String),
    /// The transport failed; an apology was recorded and `notice` carries the
    /// provider-qualified error text
    Failed {
        /// Error text to surface to the user
        notice: String,
    },
}

/// Application state for one chat user
pub struct ChatApp {
    config: Config,
    store: KvStore,
    client: ProviderClient,
    sessions: SessionStore,
    provider: ProviderKind,
    model: String,
}

impl ChatApp {
    /// Open the store, restore provider settings and load sessions
    ///
    /// When a key is stored the adapter is initialized with it. When no
    /// sessions exist a welcome-seeded session is created.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be opened or the stored sessions
    /// cannot be decoded
    pub fn open(config: Config) -> Result<Self> {
        let store = KvStore::open(config.storage_path()?)?;
        Self::with_store(config, store)
    }

    /// Build the application on an already opened store
    pub fn with_store(config: Config, store: KvStore) -> Result<Self> {
        let settings = StoredSettings::load(&store)?;
        let provider = settings
            .provider
            .unwrap_or(config.provider.provider_type);
        let model = settings
            .model
            .unwrap_or_else(|| provider.default_model().to_string());

        let mut client = ProviderClient::new(config.provider.clone());
        if let Some(key) = settings.api_key.as_deref() {
            if let Err(e) = client.initialize(provider, key, &model) {
                tracing::warn!("Stored API key could not be used: {}", e);
            }
        }

        let mut sessions = SessionStore::load(store.clone())?;
        if sessions.sessions().is_empty() {
            let welcome = welcome_text(
                &config.chat.assistant_name,
                client.current_provider(),
            );
            sessions.create_session(Some(&welcome))?;
        }

        tracing::info!(
            provider = %provider,
            model = %model,
            initialized = client.is_initialized(),
            "Chat application ready"
        );

        Ok(Self {
            config,
            store,
            client,
            sessions,
            provider,
            model,
        })
    }

    /// Send user input through the active session
    ///
    /// Input that is empty after trimming is ignored and `Ok(None)` is
    /// returned. Otherwise exactly one user message and then exactly one
    /// assistant message are appended. A transport failure is recorded as an
    /// apology message and reported as [`SendOutcome::Failed`]; the user
    /// message stays in the history.
    ///
    /// # Errors
    ///
    /// Returns [`McpbotError::Uninitialized`] without recording anything when
    /// no API key has been set, and storage errors from persisting the session
    pub async fn send_message(&mut self, text: &str) -> Result<Option<SendOutcome>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if !self.client.is_initialized() {
            return Err(McpbotError::Uninitialized.into());
        }
        if self.sessions.current().is_none() {
            self.sessions.create_session(None)?;
        }

        self.sessions.append_message(Message::user(text))?;
        let history = self
            .sessions
            .current()
            .map(|s| s.messages.clone())
            .unwrap_or_default();

        tracing::debug!("Sending {} messages to {}", history.len(), self.provider);

        match self.client.send_message(&history).await {
            Ok(reply) => {
                self.sessions
                    .append_message(Message::assistant(reply.clone()))?;
                Ok(Some(SendOutcome::Replied(reply)))
            }
            Err(e) => {
                tracing::error!("Send failed: {}", e);
                let notice = e.to_string();
                self.sessions.append_message(Message::assistant(format!(
                    "Sorry, I encountered an error: {}",
                    notice
                )))?;
                Ok(Some(SendOutcome::Failed { notice }))
            }
        }
    }

    /// Set the API key for `provider`, initialize the adapter and persist
    ///
    /// An empty `model` selects the provider's default model.
    ///
    /// # Errors
    ///
    /// Returns [`McpbotError::Config`] for an empty key; nothing is persisted
    /// in that case
    pub fn on_api_key_set(&mut self, provider: ProviderKind, api_key: &str, model: &str) -> Result<()> {
        let model = match model.trim() {
            "" => provider.default_model().to_string(),
            m => m.to_string(),
        };

        self.client.initialize(provider, api_key, &model)?;
        self.provider = provider;
        self.model = model;

        StoredSettings {
            api_key: Some(api_key.trim().to_string()),
            provider: Some(self.provider),
            model: Some(self.model.clone()),
        }
        .save(&self.store)?;

        tracing::info!(provider = %self.provider, model = %self.model, "API key set");
        Ok(())
    }

    /// Select a different provider
    ///
    /// The model resets to the provider's default and the live transport and
    /// stored key are discarded, so a key must be set again before sending.
    pub fn switch_provider(&mut self, provider: ProviderKind) -> Result<()> {
        self.provider = provider;
        self.model = provider.default_model().to_string();
        self.client.reset();

        StoredSettings {
            api_key: None,
            provider: Some(self.provider),
            model: Some(self.model.clone()),
        }
        .save(&self.store)?;

        tracing::info!(provider = %provider, "Switched provider");
        Ok(())
    }

    /// Change the model of the selected provider and persist it
    ///
    /// The live transport, if any, picks the model up immediately.
    pub fn set_model(&mut self, model: &str) -> Result<()> {
        let model = model.trim();
        if model.is_empty() {
            return Err(McpbotError::Config("Model cannot be empty".to_string()).into());
        }
        if !self.provider.models().iter().any(|m| m.id == model) {
            tracing::warn!("Model {} is not in the {} catalog", model, self.provider);
        }

        if self.client.is_initialized() {
            self.client.update_model(model)?;
        }
        self.model = model.to_string();
        self.store.set(keys::MODEL, &self.model)?;

        tracing::info!(model = %self.model, "Model changed");
        Ok(())
    }

    /// Start a new welcome-seeded session and make it active
    pub fn new_session(&mut self) -> Result<&Session> {
        let welcome = welcome_text(
            &self.config.chat.assistant_name,
            self.client.current_provider(),
        );
        self.sessions.create_session(Some(&welcome))
    }

    /// Make `id` the active session
    pub fn select_session(&mut self, id: &str) -> Result<()> {
        self.sessions.select_session(id)
    }

    /// Delete a session
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        self.sessions.delete_session(id)
    }

    /// All sessions, newest first
    pub fn sessions(&self) -> &[Session] {
        self.sessions.sessions()
    }

    /// Look up a session by id
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// The active session
    pub fn current_session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    /// Selected provider, whether or not a key is set
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Selected model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a key has been set for the selected provider
    pub fn is_configured(&self) -> bool {
        self.client.is_initialized()
    }

    /// Name the assistant introduces itself with
    pub fn assistant_name(&self) -> &str {
        &self.config.chat.assistant_name
    }

    #[cfg(test)]
    pub(crate) fn client_mut(&mut self) -> &mut ProviderClient {
        &mut self.client
    }
}
