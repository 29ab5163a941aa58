//! OpenAI provider implementation for MCP Bot
//!
//! Talks to the chat-completions endpoint. The conversation history is
//! forwarded unmodified as `{role, content}` pairs, with a fixed sampling
//! temperature and output limit, and the first choice's content is returned.

use crate::config::OpenAiConfig;
use crate::error::{McpbotError, Result};
use crate::providers::base::api_error_detail;
use crate::providers::{Message, Provider, ProviderKind, NO_RESPONSE_FALLBACK};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Sampling temperature sent with every request
pub const OPENAI_TEMPERATURE: f32 = 0.7;

/// Maximum output tokens requested per completion
pub const OPENAI_MAX_TOKENS: u32 = 2000;

/// OpenAI chat-completions provider
///
/// # Examples
///
/// ```no_run
/// use mcpbot::config::OpenAiConfig;
/// use mcpbot::providers::{Message, OpenAiProvider, Provider};
///
/// # async fn example() -> mcpbot::error::Result<()> {
/// let provider = OpenAiProvider::new(&OpenAiConfig::default(), "sk-test", "gpt-4o")?;
/// let reply = provider.send_message(&[Message::user("Hello!")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

/// Request body for `/chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// One `{role, content}` pair
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response envelope from `/chat/completions`
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(
        config: &OpenAiConfig,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mcpbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| McpbotError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let model = model.into();
        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}",
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

    /// Build the request body for a history
    fn build_request<'a>(&'a self, history: &'a [Message]) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: convert_messages(history),
            temperature: OPENAI_TEMPERATURE,
            max_tokens: OPENAI_MAX_TOKENS,
            stream: false,
        }
    }

    fn transport_error(detail: impl Into<String>) -> McpbotError {
        McpbotError::provider(ProviderKind::OpenAi.display_name(), detail)
    }
}

/// Convert history into chat-completion pairs, roles unchanged
fn convert_messages(history: &[Message]) -> Vec<ChatMessage<'_>> {
    history
        .iter()
        .map(|m| ChatMessage {
            role: m.role.as_str(),
            content: &m.text,
        })
        .collect()
}

/// Pull the first choice's text out of the envelope
fn extract_reply(response: ChatCompletionResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string())
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn send_message(&self, history: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = self.build_request(history);

        tracing::debug!(
            "Sending OpenAI request: model={}, {} messages",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("OpenAI request failed: {}", e);
                Self::transport_error(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(Self::transport_error(api_error_detail(status, &error_text)).into());
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}", e);
            Self::transport_error(format!("Failed to parse response: {}", e))
        })?;

        tracing::debug!("OpenAI response: {} choices", completion.choices.len());

        Ok(extract_reply(completion))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn set_model(&mut self, model: String) {
        tracing::info!("Switched OpenAI model to: {}", model);
        self.model = model;
    }
}
