//! Conversation state machine.
//!
//! The state is never stored. It is derived on every turn from the session
//! row and the persisted turn history, which keeps the engine stateless.

use serde::{Deserialize, Serialize};

/// Phase of a single session's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// No user turns yet; the opening message is due.
    Opening,
    /// Fewer user turns than the completion threshold.
    InProgress,
    /// Threshold reached; extraction and closing happen in this step.
    Completing,
    /// Terminal. No further turns are accepted.
    Closed,
}

impl ConversationState {
    /// Derives the state from persisted facts.
    pub fn derive(completed: bool, user_turns: usize, min_user_turns: usize) -> Self {
        if completed {
            ConversationState::Closed
        } else if user_turns == 0 {
            ConversationState::Opening
        } else if user_turns < min_user_turns.max(1) {
            ConversationState::InProgress
        } else {
            ConversationState::Completing
        }
    }

    /// Whether a user message may still be accepted.
    pub fn accepts_user_turns(&self) -> bool {
        !matches!(self, ConversationState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive() {
        assert_eq!(ConversationState::derive(false, 0, 2), ConversationState::Opening);
        assert_eq!(ConversationState::derive(false, 1, 2), ConversationState::InProgress);
        assert_eq!(ConversationState::derive(false, 2, 2), ConversationState::Completing);
        assert_eq!(ConversationState::derive(false, 5, 2), ConversationState::Completing);
        assert_eq!(ConversationState::derive(true, 2, 2), ConversationState::Closed);
    }

    #[test]
    fn test_zero_threshold_still_needs_one_user_turn() {
        assert_eq!(ConversationState::derive(false, 0, 0), ConversationState::Opening);
        assert_eq!(ConversationState::derive(false, 1, 0), ConversationState::Completing);
    }

    #[test]
    fn test_closed_rejects_user_turns() {
        assert!(!ConversationState::Closed.accepts_user_turns());
        assert!(ConversationState::Completing.accepts_user_turns());
        assert!(ConversationState::Opening.accepts_user_turns());
    }
}
