//! Builds the configured provider.
//!
//! API keys come from `secret.json` first, then from the provider's
//! environment variable. The model comes from `config.toml`, then from
//! `secret.json`, then from the provider default.

use crate::claude_api_provider::{ANTHROPIC_API_KEY_ENV, ClaudeApiProvider, DEFAULT_CLAUDE_MODEL};
use crate::http::{DEFAULT_TIMEOUT_SECS, build_client};
use crate::openai_api_provider::{DEFAULT_OPENAI_MODEL, OPENAI_API_KEY_ENV, OpenAiApiProvider};
use cadence_core::config::{ApiKeyConfig, ProviderKind, ProviderSettings, SecretConfig};
use cadence_core::provider::{LlmProvider, ProviderError};
use cadence_infrastructure::{SecretStorage, SecretStorageError};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Builds the provider selected in `settings`, loading keys from the
/// default `secret.json` and the environment.
pub fn provider_from_environment(settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let secrets = load_secrets()?;
    provider_from_settings(settings, &secrets)
}

/// Builds the provider selected in `settings` from already-loaded secrets.
pub fn provider_from_settings(
    settings: &ProviderSettings,
    secrets: &SecretConfig,
) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    build_provider(settings, secrets, |name| env::var(name).ok())
}

fn load_secrets() -> Result<SecretConfig, ProviderError> {
    let storage = SecretStorage::new()
        .map_err(|err| ProviderError::Configuration(err.to_string()))?;
    match storage.load() {
        Ok(secrets) => Ok(secrets),
        Err(SecretStorageError::NotFound(path)) => {
            tracing::debug!("[Provider] No secret file at {}, using environment", path.display());
            Ok(SecretConfig::default())
        }
        Err(err) => Err(ProviderError::Configuration(err.to_string())),
    }
}

fn build_provider<F>(
    settings: &ProviderSettings,
    secrets: &SecretConfig,
    env_lookup: F,
) -> Result<Arc<dyn LlmProvider>, ProviderError>
where
    F: Fn(&str) -> Option<String>,
{
    let timeout = Duration::from_secs(settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let client = build_client(timeout)?;

    let provider: Arc<dyn LlmProvider> = match settings.kind {
        ProviderKind::Claude => {
            let (api_key, model) = resolve(
                settings,
                secrets.claude.as_ref(),
                ANTHROPIC_API_KEY_ENV,
                DEFAULT_CLAUDE_MODEL,
                &env_lookup,
            )?;
            tracing::info!("[Provider] Using Claude model {}", model);
            Arc::new(ClaudeApiProvider::new(api_key, model).with_client(client))
        }
        ProviderKind::OpenAi => {
            let (api_key, model) = resolve(
                settings,
                secrets.openai.as_ref(),
                OPENAI_API_KEY_ENV,
                DEFAULT_OPENAI_MODEL,
                &env_lookup,
            )?;
            tracing::info!("[Provider] Using OpenAI model {}", model);
            Arc::new(OpenAiApiProvider::new(api_key, model).with_client(client))
        }
    };
    Ok(provider)
}

/// Returns `(api_key, model)`.
fn resolve<F>(
    settings: &ProviderSettings,
    secret: Option<&ApiKeyConfig>,
    env_name: &str,
    default_model: &str,
    env_lookup: &F,
) -> Result<(String, String), ProviderError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = secret
        .map(|config| config.api_key.clone())
        .filter(|key| !key.trim().is_empty())
        .or_else(|| env_lookup(env_name).filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| {
            ProviderError::Configuration(format!(
                "{env_name} not found in secret.json or environment variables"
            ))
        })?;

    let model = settings
        .model
        .clone()
        .or_else(|| secret.and_then(|config| config.model_name.clone()))
        .unwrap_or_else(|| default_model.to_string());

    Ok((api_key, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_secret_key_wins_over_environment() {
        let secrets = SecretConfig {
            claude: Some(ApiKeyConfig {
                api_key: "from-secret".to_string(),
                model_name: Some("claude-from-secret".to_string()),
            }),
            openai: None,
        };
        let (key, model) = resolve(
            &ProviderSettings::default(),
            secrets.claude.as_ref(),
            ANTHROPIC_API_KEY_ENV,
            DEFAULT_CLAUDE_MODEL,
            &|_: &str| Some("from-env".to_string()),
        )
        .unwrap();
        assert_eq!(key, "from-secret");
        assert_eq!(model, "claude-from-secret");
    }

    #[test]
    fn test_environment_fallback_and_configured_model() {
        let settings = ProviderSettings {
            kind: ProviderKind::OpenAi,
            model: Some("gpt-4o-mini".to_string()),
            timeout_secs: None,
        };
        let (key, model) = resolve(
            &settings,
            None,
            OPENAI_API_KEY_ENV,
            DEFAULT_OPENAI_MODEL,
            &|name: &str| (name == OPENAI_API_KEY_ENV).then(|| "sk-env".to_string()),
        )
        .unwrap();
        assert_eq!(key, "sk-env");
        assert_eq!(model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let result = build_provider(&ProviderSettings::default(), &SecretConfig::default(), no_env);
        match result {
            Err(ProviderError::Configuration(message)) => assert!(message.contains(ANTHROPIC_API_KEY_ENV)),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn test_builds_selected_provider() {
        let secrets = SecretConfig {
            claude: None,
            openai: Some(ApiKeyConfig {
                api_key: "sk-test".to_string(),
                model_name: None,
            }),
        };
        let settings = ProviderSettings {
            kind: ProviderKind::OpenAi,
            model: None,
            timeout_secs: Some(5),
        };
        let provider = build_provider(&settings, &secrets, no_env).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
