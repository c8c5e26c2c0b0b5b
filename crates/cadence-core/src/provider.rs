//! Language-model provider interface.
//!
//! The provider is an injected dependency. Implementations live in
//! `cadence-interaction`; tests use hand-written doubles.

use crate::session::{ConversationTurn, TurnRole};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A single chat message sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: TurnRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// One completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// Turn history, oldest first
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system: system.into(),
            messages,
            temperature: 0.7,
            max_tokens: 300,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Errors raised by a provider call.
///
/// These never reach end users: the conversation engine replaces them with
/// fallback text.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The request could not be sent or timed out
    #[error("Request failed: {message}")]
    Request { message: String, is_retryable: bool },

    /// The provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The provider answered without any text
    #[error("Provider returned empty content")]
    EmptyResponse,

    /// The response body could not be decoded
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// Missing key, unknown provider kind, ...
    #[error("Provider configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Request { is_retryable, .. } => *is_retryable,
            ProviderError::Http { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }
}

impl From<ProviderError> for crate::error::CadenceError {
    fn from(err: ProviderError) -> Self {
        crate::error::CadenceError::Provider(err.to_string())
    }
}

/// A chat-completion capable language model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs (e.g. "claude").
    fn name(&self) -> &str;

    /// Runs one completion and returns the generated text.
    ///
    /// Implementations should map blank output to
    /// [`ProviderError::EmptyResponse`].
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}
