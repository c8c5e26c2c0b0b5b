//! Language-model providers for cadence.
//!
//! Each provider implements [`cadence_core::provider::LlmProvider`] over a
//! vendor HTTP API. [`provider_from_environment`] picks one according to the
//! `[provider]` section of `config.toml`.

pub mod claude_api_provider;
pub mod factory;
mod http;
pub mod openai_api_provider;

pub use claude_api_provider::ClaudeApiProvider;
pub use factory::{provider_from_environment, provider_from_settings};
pub use http::DEFAULT_TIMEOUT_SECS;
pub use openai_api_provider::OpenAiApiProvider;
