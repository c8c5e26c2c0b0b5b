//! Configuration model.
//!
//! Every field has a default so a partial (or absent) `config.toml` still
//! yields a usable configuration. Loading and caching live in
//! `cadence-infrastructure::ConfigService`.

use crate::agent::{AgentCode, GenerationSettings};
use crate::member::Seniority;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use strum::{AsRefStr, Display, EnumString};

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    pub scheduler: SchedulerSettings,
    pub conversation: ConversationSettings,
    pub provider: ProviderSettings,
    pub storage: StorageSettings,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// New sessions created per member in one pass
    pub max_new_sessions_per_member: usize,
    /// Members processed concurrently within one pass
    pub max_concurrency: usize,
    /// Seconds between passes when running as a service
    pub interval_secs: u64,
    pub cadence: CadenceSettings,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_new_sessions_per_member: 1,
            max_concurrency: 1,
            interval_secs: 3600,
            cadence: CadenceSettings::default(),
        }
    }
}

/// Minimum days between completed sessions, per topic.
///
/// Topics missing from a table fall back to the individual-contributor
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicIntervals {
    pub pulse: u32,
    pub role_mapper: u32,
    pub workflow_mapper: u32,
    pub pain_scanner: u32,
    pub focus_tracker: u32,
}

impl TopicIntervals {
    pub fn days(&self, code: AgentCode) -> u32 {
        match code {
            AgentCode::Pulse => self.pulse,
            AgentCode::RoleMapper => self.role_mapper,
            AgentCode::WorkflowMapper => self.workflow_mapper,
            AgentCode::PainScanner => self.pain_scanner,
            AgentCode::FocusTracker => self.focus_tracker,
        }
    }
}

impl Default for TopicIntervals {
    fn default() -> Self {
        Self {
            pulse: 7,
            role_mapper: 90,
            workflow_mapper: 30,
            pain_scanner: 14,
            focus_tracker: 7,
        }
    }
}

/// `[scheduler.cadence]` section: interval tables per seniority.
///
/// Individual contributors and members without a seniority use `default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceSettings {
    pub default: TopicIntervals,
    pub manager: TopicIntervals,
    pub executive: TopicIntervals,
}

impl Default for CadenceSettings {
    fn default() -> Self {
        Self {
            default: TopicIntervals::default(),
            manager: TopicIntervals {
                pulse: 7,
                role_mapper: 90,
                workflow_mapper: 30,
                pain_scanner: 14,
                focus_tracker: 14,
            },
            executive: TopicIntervals {
                pulse: 14,
                role_mapper: 180,
                workflow_mapper: 60,
                pain_scanner: 30,
                focus_tracker: 14,
            },
        }
    }
}

impl CadenceSettings {
    pub fn intervals_for(&self, seniority: Seniority) -> &TopicIntervals {
        match seniority {
            Seniority::Executive => &self.executive,
            Seniority::Manager => &self.manager,
            Seniority::IndividualContributor | Seniority::Unset => &self.default,
        }
    }

    /// Minimum interval for `code` at `seniority`.
    pub fn interval_for(&self, seniority: Seniority, code: AgentCode) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.intervals_for(seniority).days(code)))
    }
}

/// `[conversation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// User turns before a conversation may close
    pub min_user_turns: usize,
    /// Per-topic overrides of `min_user_turns`, keyed by agent code
    pub min_user_turns_by_topic: HashMap<String, usize>,
    pub conversation_temperature: f32,
    pub conversation_max_tokens: u32,
    pub extraction_temperature: f32,
    pub extraction_max_tokens: u32,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        let generation = GenerationSettings::default();
        Self {
            min_user_turns: crate::agent::DEFAULT_MIN_USER_TURNS,
            min_user_turns_by_topic: HashMap::new(),
            conversation_temperature: generation.conversation_temperature,
            conversation_max_tokens: generation.conversation_max_tokens,
            extraction_temperature: generation.extraction_temperature,
            extraction_max_tokens: generation.extraction_max_tokens,
        }
    }
}

impl ConversationSettings {
    pub fn min_user_turns_for(&self, code: AgentCode) -> usize {
        self.min_user_turns_by_topic
            .get(code.as_ref())
            .copied()
            .unwrap_or(self.min_user_turns)
            .max(1)
    }

    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            conversation_temperature: self.conversation_temperature,
            conversation_max_tokens: self.conversation_max_tokens,
            extraction_temperature: self.extraction_temperature,
            extraction_max_tokens: self.extraction_max_tokens,
        }
    }
}

/// Which HTTP provider backs the conversations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Claude,
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
}

/// `[provider]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Model name; the provider's default when absent
    pub model: Option<String>,
    /// Request timeout in seconds; the provider's default when absent
    pub timeout_secs: Option<u64>,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Data directory; `~/.local/share/cadence` when absent
    pub data_dir: Option<PathBuf>,
}

/// Contents of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretConfig {
    /// Anthropic API configuration
    #[serde(default)]
    pub claude: Option<ApiKeyConfig>,
    /// OpenAI API configuration
    #[serde(default)]
    pub openai: Option<ApiKeyConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}
