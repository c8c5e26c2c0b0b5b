//! Profile domain model.
//!
//! One cumulative document per member. Each topic owns a typed section;
//! absent sections mean the fact is still unknown.

use super::gaps::compute_gaps;
use crate::agent::AgentCode;
use crate::extraction::BurnoutRisk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pain points kept per profile. Older entries are evicted first.
pub const MAX_PAIN_POINTS: usize = 5;

/// Morale label derived from the latest Pulse check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoraleTrend {
    Positive,
    Stable,
    Declining,
    AtRisk,
}

/// Direction a pain point is moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PainTrend {
    Worsening,
    Stable,
    Improving,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSection {
    pub role_summary: String,
    #[serde(default)]
    pub primary_duties: Vec<String>,
    #[serde(default)]
    pub customer_facing: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainPointEntry {
    pub description: String,
    #[serde(default)]
    pub workflow_name: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    pub rating: u8,
    pub trend: PainTrend,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentFocus {
    pub label: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleSnapshot {
    pub rating: u8,
    pub burnout_risk: BurnoutRisk,
    pub trend: MoraleTrend,
    pub updated_at: DateTime<Utc>,
}

/// A fact the profile is still missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapField {
    RoleSummary,
    MainWorkflows,
    CurrentFocus,
    PainPoints,
}

impl GapField {
    /// The topic whose record closes this gap.
    pub fn closing_agent(&self) -> AgentCode {
        match self {
            GapField::RoleSummary => AgentCode::RoleMapper,
            GapField::MainWorkflows => AgentCode::WorkflowMapper,
            GapField::CurrentFocus => AgentCode::FocusTracker,
            GapField::PainPoints => AgentCode::PainScanner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileGap {
    pub field: GapField,
    pub priority: GapPriority,
}

/// The cumulative knowledge document for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub member_id: String,
    /// Storage version for optimistic concurrency; 0 means never stored
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub role: Option<RoleSection>,
    #[serde(default)]
    pub main_workflows: Vec<WorkflowEntry>,
    /// Union of every workflow's tools, deduplicated case-insensitively
    #[serde(default)]
    pub tools: Vec<String>,
    /// Most recent pain points, oldest first, at most `MAX_PAIN_POINTS`
    #[serde(default)]
    pub pain_points: Vec<PainPointEntry>,
    #[serde(default)]
    pub current_focus: Option<CurrentFocus>,
    #[serde(default)]
    pub morale: Option<MoraleSnapshot>,
    /// Derived; regenerated after every merge
    #[serde(default)]
    pub open_profile_gaps: Vec<ProfileGap>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// An empty, never-stored profile with every gap open.
    pub fn empty(member_id: impl Into<String>) -> Self {
        let mut profile = Self {
            member_id: member_id.into(),
            version: 0,
            role: None,
            main_workflows: Vec::new(),
            tools: Vec::new(),
            pain_points: Vec::new(),
            current_focus: None,
            morale: None,
            open_profile_gaps: Vec::new(),
            updated_at: None,
        };
        profile.open_profile_gaps = compute_gaps(&profile);
        profile
    }

    pub fn role_summary(&self) -> Option<&str> {
        self.role.as_ref().map(|role| role.role_summary.as_str())
    }

    pub fn morale_trend(&self) -> Option<MoraleTrend> {
        self.morale.as_ref().map(|morale| morale.trend)
    }

    pub fn has_gap(&self, field: GapField) -> bool {
        self.open_profile_gaps.iter().any(|gap| gap.field == field)
    }

    pub fn find_workflow(&self, name: &str) -> Option<&WorkflowEntry> {
        let key = super::merge::normalize_key(name);
        self.main_workflows
            .iter()
            .find(|workflow| super::merge::normalize_key(&workflow.name) == key)
    }
}
