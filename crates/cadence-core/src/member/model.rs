//! Member domain model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Seniority level of a member, used to pick cadence intervals.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Seniority {
    Executive,
    Manager,
    IndividualContributor,
    #[default]
    Unset,
}

impl Seniority {
    /// Human readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Seniority::Executive => "executive",
            Seniority::Manager => "manager",
            Seniority::IndividualContributor => "individual contributor",
            Seniority::Unset => "team member",
        }
    }
}

/// Membership status within the organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Invited,
    Disabled,
}

/// A person within an organization.
///
/// Combines the membership row with what the identity lookup returns for
/// the person (display name, job title), so agents can personalize their
/// messages from a single read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Identity reference
    pub id: String,
    /// Owning organization
    pub organization_id: String,
    /// Display name from the identity provider
    pub display_name: String,
    /// Job title, if known
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    /// Department display name, if the member belongs to one
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub seniority: Seniority,
    #[serde(default)]
    pub status: MembershipStatus,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    /// First word of the display name, for friendly greetings.
    pub fn first_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(self.display_name.as_str())
    }
}
