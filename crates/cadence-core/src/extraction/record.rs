//! Extracted record types.
//!
//! One record is produced per completed session. Records are immutable and
//! are the only input to profile merging.

use crate::agent::AgentCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// Burnout signal reported by a Pulse check-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutRisk {
    #[default]
    Low,
    Medium,
    High,
}

/// Morale check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseRecord {
    /// Morale rating, 1 (very low) to 5 (very high)
    pub rating: u8,
    #[serde(default)]
    pub burnout_risk: BurnoutRisk,
    #[serde(default)]
    pub stressors: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// What the member's role is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub role_summary: String,
    #[serde(default)]
    pub primary_duties: Vec<String>,
    #[serde(default)]
    pub customer_facing: bool,
}

/// One recurring workflow the member runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub workflow_name: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

/// A friction point, optionally tied to a workflow and/or a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainPointRecord {
    pub pain_description: String,
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    /// How things are going around this pain point, 1 (getting much worse)
    /// to 5 (clearly improving)
    pub rating: u8,
}

/// What the member is focused on right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRecord {
    pub current_focus_label: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A typed record for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum ExtractedRecord {
    Pulse(PulseRecord),
    RoleMapper(RoleRecord),
    WorkflowMapper(WorkflowRecord),
    PainScanner(PainPointRecord),
    FocusTracker(FocusRecord),
}

impl ExtractedRecord {
    /// The topic this record belongs to.
    pub fn agent_code(&self) -> AgentCode {
        match self {
            ExtractedRecord::Pulse(_) => AgentCode::Pulse,
            ExtractedRecord::RoleMapper(_) => AgentCode::RoleMapper,
            ExtractedRecord::WorkflowMapper(_) => AgentCode::WorkflowMapper,
            ExtractedRecord::PainScanner(_) => AgentCode::PainScanner,
            ExtractedRecord::FocusTracker(_) => AgentCode::FocusTracker,
        }
    }
}

/// A record as persisted after its session completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub session_id: String,
    pub member_id: String,
    pub record: ExtractedRecord,
    pub extracted_at: DateTime<Utc>,
    /// Set once the record has been merged into the member's profile
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}
