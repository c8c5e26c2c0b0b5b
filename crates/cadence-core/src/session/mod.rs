//! Session domain module.
//!
//! This module contains all session-related domain models and repository
//! interfaces.
//!
//! # Module Structure
//!
//! - `model`: Core session entity (`Session`, `SessionSource`)
//! - `message`: Conversation turn types (`TurnRole`, `ConversationTurn`)
//! - `state`: Conversation state machine (`ConversationState`)
//! - `repository`: Repository traits for session and turn persistence

mod message;
mod model;
mod repository;
mod state;

// Re-export public API
pub use message::{ConversationTurn, TurnRole, count_user_turns};
pub use model::{Session, SessionSource};
pub use repository::{SessionRepository, TurnRepository};
pub use state::ConversationState;
