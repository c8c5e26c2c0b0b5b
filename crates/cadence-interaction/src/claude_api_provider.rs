//! Anthropic Messages API provider.

use crate::http::{map_http_error, map_request_error, non_empty, parse_retry_after};
use async_trait::async_trait;
use cadence_core::provider::{ChatMessage, CompletionRequest, LlmProvider, ProviderError};
use cadence_core::session::TurnRole;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// The Messages API requires the first message to come from the user.
const CONVERSATION_START: &str = "(conversation start)";

pub struct ClaudeApiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeApiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Replaces the HTTP client (e.g. one built with a timeout).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: CompletionRequest) -> MessagesRequest {
        let mut messages: Vec<Message> = Vec::with_capacity(request.messages.len() + 1);
        if request
            .messages
            .first()
            .is_some_and(|message| message.role == TurnRole::Assistant)
        {
            messages.push(Message::user(CONVERSATION_START));
        }
        messages.extend(request.messages.into_iter().map(Message::from));

        MessagesRequest {
            model: self.model.clone(),
            system: (!request.system.is_empty()).then_some(request.system),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeApiProvider {
    fn name(&self) -> &str {
        "claude"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = self.build_request(request);
        tracing::debug!(
            "[ClaudeApiProvider] Sending {} messages to {}",
            body.messages.len(),
            self.model
        );

        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_request_error("Claude", err))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body, retry_after));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Malformed(err.to_string()))?;
        non_empty(parsed.text())
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

impl Message {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

impl From<ChatMessage> for Message {
    fn from(message: ChatMessage) -> Self {
        let role = match message.role {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        };
        Self {
            role,
            content: message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// Concatenates the text blocks, or `None` if there are none.
    fn text(self) -> Option<String> {
        let parts: Vec<String> = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text),
                ResponseContentBlock::Other => None,
            })
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n"))
    }
}
