//! Session domain model.
//!
//! A session is one instance of a member being offered one agent topic.

use crate::agent::AgentCode;
use crate::error::{CadenceError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who created the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionSource {
    /// Created by the scheduling pass
    Autopilot,
    /// Created on request (e.g. by an administrator)
    Manual,
}

/// One offered instance of a topic to one member.
///
/// Sessions are never deleted. The scheduling pass creates them; the
/// conversation engine stamps `started_at` and `completed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    pub member_id: String,
    pub organization_id: String,
    /// Topic offered in this session
    pub agent_code: AgentCode,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub source: SessionSource,
}

impl Session {
    /// Creates a new, pending session scheduled for `scheduled_for`.
    pub fn new(
        member_id: impl Into<String>,
        organization_id: impl Into<String>,
        agent_code: AgentCode,
        source: SessionSource,
        scheduled_for: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            member_id: member_id.into(),
            organization_id: organization_id.into(),
            agent_code,
            scheduled_for,
            started_at: None,
            completed_at: None,
            source,
        }
    }

    /// A session is pending until it has a completion timestamp.
    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Stamps `started_at` the first time the session is opened.
    ///
    /// Returns `true` if the timestamp was set by this call.
    pub fn mark_started(&mut self, now: DateTime<Utc>) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Closes the session. A session can be closed exactly once.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> Result<()> {
        if let Some(completed_at) = self.completed_at {
            return Err(CadenceError::invalid_state(format!(
                "session {} was already completed at {}",
                self.id,
                completed_at.to_rfc3339()
            )));
        }
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.completed_at = Some(now);
        Ok(())
    }
}
