//! Conversational agents.
//!
//! Each topic is a variant of the closed [`AgentCode`] set and is backed by
//! one [`TopicAgent`] implementation. The shared turn logic (opening,
//! follow-up, completion gating, extraction, provider fallbacks) lives in the
//! trait's provided methods, so a topic only supplies its instruction text,
//! extraction schema, prior-value lookup and fallback lines.
//!
//! # Example
//!
//! ```ignore
//! use cadence_core::agent::{AgentCode, AgentContext};
//!
//! let agent = AgentCode::Pulse.definition();
//! let opening = agent.opening_message(provider.as_ref(), &context).await;
//! ```

mod code;
mod context;
mod contract;
mod focus_tracker;
mod pain_scanner;
mod prompts;
mod pulse;
mod role_mapper;
mod workflow_mapper;

pub use code::AgentCode;
pub use context::{AgentContext, GenerationSettings};
pub use contract::{DEFAULT_MIN_USER_TURNS, TopicAgent, TurnOutcome};
pub use focus_tracker::FocusTrackerAgent;
pub use pain_scanner::PainScannerAgent;
pub use pulse::PulseAgent;
pub use role_mapper::RoleMapperAgent;
pub use workflow_mapper::WorkflowMapperAgent;
