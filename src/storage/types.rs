use super::KvStore;
use crate::error::Result;
use crate::providers::ProviderKind;

/// Keys used in the key-value store
pub mod keys {
    /// User-supplied API key
    pub const API_KEY: &str = "mcpbot.api_key";
    /// Selected provider identifier
    pub const PROVIDER: &str = "mcpbot.provider";
    /// Selected model identifier
    pub const MODEL: &str = "mcpbot.model";
    /// JSON array of all sessions
    pub const SESSIONS: &str = "mcpbot.sessions";
    /// Id of the active session
    pub const CURRENT_SESSION: &str = "mcpbot.current_session";
}

/// Persisted provider selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSettings {
    /// API key, if one has been set
    pub api_key: Option<String>,
    /// Selected provider, if one has been stored
    pub provider: Option<ProviderKind>,
    /// Selected model, if one has been stored
    pub model: Option<String>,
}

impl StoredSettings {
    /// Read the provider keys from the store
    ///
    /// An unparseable provider value is logged and treated as absent.
    pub fn load(store: &KvStore) -> Result<Self> {
        let provider = match store.get(keys::PROVIDER)? {
            Some(raw) => match raw.parse() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!("Ignoring stored provider {:?}: {}", raw, e);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            api_key: store.get(keys::API_KEY)?.filter(|k| !k.is_empty()),
            provider,
            model: store.get(keys::MODEL)?.filter(|m| !m.is_empty()),
        })
    }

    /// Write the provider keys; `None` fields are removed from the store
    pub fn save(&self, store: &KvStore) -> Result<()> {
        match &self.api_key {
            Some(key) => store.set(keys::API_KEY, key)?,
            None => store.remove(keys::API_KEY)?,
        }
        match self.provider {
            Some(kind) => store.set(keys::PROVIDER, kind.as_str())?,
            None => store.remove(keys::PROVIDER)?,
        }
        match &self.model {
            Some(model) => store.set(keys::MODEL, model)?,
            None => store.remove(keys::MODEL)?,
        }
        Ok(())
    }
}
