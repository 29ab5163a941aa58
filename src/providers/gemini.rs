//! Gemini provider implementation for MCP Bot
//!
//! Gemini is driven as a single-shot generator: system messages are dropped
//! and the remaining history is flattened into one prompt of
//! `"User: ..."` / `"Assistant: ..."` blocks separated by blank lines.

use crate::config::GeminiConfig;
use crate::error::{McpbotError, Result};
use crate::providers::base::api_error_detail;
use crate::providers::{Message, Provider, ProviderKind, Role, NO_RESPONSE_FALLBACK};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Google Gemini generate-content provider
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Response envelope from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

/// Flatten a history into a single prompt
///
/// System messages are dropped; every other message becomes a
/// `"<Role>: <text>"` block, joined with blank lines in original order.
///
/// # Examples
///
/// ```
/// use mcpbot::providers::{flatten_history, Message};
///
/// let history = vec![
///     Message::system("be brief"),
///     Message::user("Hi"),
///     Message::assistant("Hello!"),
/// ];
/// assert_eq!(flatten_history(&history), "User: Hi\n\nAssistant: Hello!");
/// ```
pub fn flatten_history(history: &[Message]) -> String {
    history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let label = match m.role {
                Role::User => "User",
                _ => "Assistant",
            };
            format!("{}: {}", label, m.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(
        config: &GeminiConfig,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mcpbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| McpbotError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let model = model.into();
        tracing::info!(
            "Initialized Gemini provider: api_base={}, model={}",
            config.api_base,
            model
        );

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model,
        })
    }

    fn build_request(prompt: String) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
        }
    }

    fn transport_error(detail: impl Into<String>) -> McpbotError {
        McpbotError::provider(ProviderKind::Gemini.display_name(), detail)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_reply(response: GenerateContentResponse) -> String {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        NO_RESPONSE_FALLBACK.to_string()
    } else {
        text
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn send_message(&self, history: &[Message]) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let prompt = flatten_history(history);

        tracing::debug!(
            "Sending Gemini request: model={}, prompt_chars={}",
            self.model,
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                Self::transport_error(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(Self::transport_error(api_error_detail(status, &error_text)).into());
        }

        let generated: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            Self::transport_error(format!("Failed to parse response: {}", e))
        })?;

        Ok(extract_reply(generated))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: String) {
        tracing::info!("Switched Gemini model to: {}", model);
        self.model = model;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_drops_system_and_labels_roles() {
        let history = vec![
            Message::user("What is Rust?"),
            Message::system("Answer in one line"),
            Message::assistant("A systems language."),
            Message::user("Thanks"),
        ];

        assert_eq!(
            flatten_history(&history),
            "User: What is Rust?\n\nAssistant: A systems language.\n\nUser: Thanks"
        );
    }

    #[test]
    fn test_flatten_empty_history() {
        assert_eq!(flatten_history(&[]), "");
        assert_eq!(flatten_history(&[Message::system("only system")]), "");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GeminiProvider::build_request("User: Hi".into())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "User: Hi"}]}]
            })
        );
    }

    #[test]
    fn test_extract_reply_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_reply(response), "Hello, world");
    }

    #[test]
    fn test_extract_reply_fallback() {
        let blocked: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert_eq!(extract_reply(blocked), NO_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_gemini_provider_model() {
        let mut provider =
            GeminiProvider::new(&GeminiConfig::default(), "key", "gemini-1.5-pro").unwrap();
        assert_eq!(provider.kind(), ProviderKind::Gemini);
        provider.set_model("gemini-1.5-flash".to_string());
        assert_eq!(provider.model(), "gemini-1.5-flash");
    }
}
