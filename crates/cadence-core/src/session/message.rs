//! Conversation turn types.
//!
//! Turns form an ordered, append-only history scoped to one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the author of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Message from the member.
    User,
    /// Message from the agent.
    Assistant,
}

/// A single turn in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// The author of the turn.
    pub role: TurnRole,
    /// The content of the turn.
    pub content: String,
    /// When the turn was recorded.
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == TurnRole::User
    }
}

/// Number of member-authored turns in a history.
pub fn count_user_turns(turns: &[ConversationTurn]) -> usize {
    turns.iter().filter(|turn| turn.is_user()).count()
}
