//! Test utilities for MCP Bot
//!
//! Provides a configuration pointing at a temporary store and a scripted
//! [`Provider`] for exercising the application core without HTTP.

use crate::config::Config;
use crate::error::{McpbotError, Result};
use crate::providers::{Message, Provider, ProviderKind};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Create a test configuration whose store lives under `dir`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.storage.path = Some(dir.join("store"));
    config
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Scripted provider that records every history it is sent
pub struct MockProvider {
    outcome: std::result::Result<String, (String, String)>,
    model: String,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Provider that always replies with `text`
    pub fn replying(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            model: "mock-model".to_string(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that always fails with a provider-qualified error
    pub fn failing(provider: &str, message: &str) -> Self {
        Self {
            outcome: Err((provider.to_string(), message.to_string())),
            model: "mock-model".to_string(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the histories received so far
    pub fn seen_histories(&self) -> Arc<Mutex<Vec<Vec<Message>>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn send_message(&self, history: &[Message]) -> Result<String> {
        self.seen
            .lock()
            .expect("mock history lock poisoned")
            .push(history.to_vec());
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err((provider, message)) => Err(McpbotError::provider(provider, message).into()),
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: String) {
        self.model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_config_uses_given_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        assert_eq!(config.storage_path().unwrap(), dir.path().join("store"));
        assert!(config.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(McpbotError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[tokio::test]
    async fn test_mock_provider_records_history() {
        let mock = MockProvider::replying("ok");
        let seen = mock.seen_histories();

        let reply = mock.send_message(&[Message::user("hi")]).await.unwrap();

        assert_eq!(reply, "ok");
        assert_eq!(seen.lock().unwrap()[0][0].text, "hi");
    }

    #[tokio::test]
    async fn test_mock_provider_failure_is_qualified() {
        let mock = MockProvider::failing("OpenAI", "bad key");
        assert_error_contains(mock.send_message(&[]).await, "OpenAI Error: bad key");
    }
}
