//! Per-turn agent context.

use crate::member::Member;
use crate::profile::Profile;
use crate::session::{ConversationTurn, TurnRole, count_user_turns};
use serde::{Deserialize, Serialize};

/// Sampling parameters for the two kinds of provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub conversation_temperature: f32,
    pub conversation_max_tokens: u32,
    pub extraction_temperature: f32,
    pub extraction_max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            conversation_temperature: 0.7,
            conversation_max_tokens: 300,
            extraction_temperature: 0.1,
            extraction_max_tokens: 600,
        }
    }
}

/// Everything an agent needs for one call.
///
/// The context is rebuilt from storage on every turn; agents keep no state
/// between calls.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub member: Member,
    /// The member's profile, if one exists yet
    pub profile: Option<Profile>,
    /// Turn history, oldest first
    pub turns: Vec<ConversationTurn>,
    /// Overrides the agent's own completion threshold
    pub min_user_turns: Option<usize>,
    pub generation: GenerationSettings,
}

impl AgentContext {
    pub fn new(member: Member, profile: Option<Profile>, turns: Vec<ConversationTurn>) -> Self {
        Self {
            member,
            profile,
            turns,
            min_user_turns: None,
            generation: GenerationSettings::default(),
        }
    }

    pub fn with_min_user_turns(mut self, min_user_turns: usize) -> Self {
        self.min_user_turns = Some(min_user_turns);
        self
    }

    pub fn with_generation(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    pub fn user_turn_count(&self) -> usize {
        count_user_turns(&self.turns)
    }

    /// Plain-text transcript used as extraction input.
    pub fn transcript(&self) -> String {
        let name = self.member.first_name();
        self.turns
            .iter()
            .map(|turn| match turn.role {
                TurnRole::Assistant => format!("Assistant: {}", turn.content),
                TurnRole::User => format!("{}: {}", name, turn.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
