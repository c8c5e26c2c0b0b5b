//! Agent codes.

use super::contract::TopicAgent;
use super::{FocusTrackerAgent, PainScannerAgent, PulseAgent, RoleMapperAgent, WorkflowMapperAgent};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The closed set of conversation topics.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AgentCode {
    /// Morale and burnout check-in
    Pulse,
    /// What the member's role is
    RoleMapper,
    /// Recurring workflows, their steps and tools
    WorkflowMapper,
    /// Friction points in workflows and tools
    PainScanner,
    /// What the member is focused on right now
    FocusTracker,
}

static PULSE: PulseAgent = PulseAgent;
static ROLE_MAPPER: RoleMapperAgent = RoleMapperAgent;
static WORKFLOW_MAPPER: WorkflowMapperAgent = WorkflowMapperAgent;
static PAIN_SCANNER: PainScannerAgent = PainScannerAgent;
static FOCUS_TRACKER: FocusTrackerAgent = FocusTrackerAgent;

impl AgentCode {
    /// Every topic, in fixed tie-break order.
    pub const ALL: [AgentCode; 5] = [
        AgentCode::Pulse,
        AgentCode::RoleMapper,
        AgentCode::WorkflowMapper,
        AgentCode::PainScanner,
        AgentCode::FocusTracker,
    ];

    /// The agent implementing this topic.
    pub fn definition(self) -> &'static dyn TopicAgent {
        match self {
            AgentCode::Pulse => &PULSE,
            AgentCode::RoleMapper => &ROLE_MAPPER,
            AgentCode::WorkflowMapper => &WORKFLOW_MAPPER,
            AgentCode::PainScanner => &PAIN_SCANNER,
            AgentCode::FocusTracker => &FOCUS_TRACKER,
        }
    }

    /// Name the agent introduces itself with.
    pub fn display_name(self) -> &'static str {
        match self {
            AgentCode::Pulse => "Pulse",
            AgentCode::RoleMapper => "Role Mapper",
            AgentCode::WorkflowMapper => "Workflow Mapper",
            AgentCode::PainScanner => "Pain Scanner",
            AgentCode::FocusTracker => "Focus Tracker",
        }
    }

    /// Position in [`AgentCode::ALL`].
    pub fn order(self) -> usize {
        match self {
            AgentCode::Pulse => 0,
            AgentCode::RoleMapper => 1,
            AgentCode::WorkflowMapper => 2,
            AgentCode::PainScanner => 3,
            AgentCode::FocusTracker => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_string_forms() {
        assert_eq!(AgentCode::RoleMapper.to_string(), "role_mapper");
        assert_eq!(AgentCode::from_str("pain_scanner").unwrap(), AgentCode::PainScanner);
        assert!(AgentCode::from_str("weather").is_err());
        assert_eq!(serde_json::to_string(&AgentCode::FocusTracker).unwrap(), "\"focus_tracker\"");
    }

    #[test]
    fn test_definitions_match_codes() {
        for code in AgentCode::iter() {
            assert_eq!(code.definition().code(), code);
            assert_eq!(AgentCode::ALL[code.order()], code);
        }
    }
}
