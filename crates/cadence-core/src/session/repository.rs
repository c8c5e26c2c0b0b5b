//! Session and turn repository traits.
//!
//! Defines the interface for session persistence operations.

use super::message::ConversationTurn;
use super::model::Session;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// This trait decouples the core from the storage mechanism. Implementations
/// never delete sessions and never need multi-document transactions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Inserts a new session.
    ///
    /// Fails if a session with the same ID already exists.
    async fn insert(&self, session: &Session) -> Result<()>;

    /// Updates an existing session (start/complete timestamps).
    ///
    /// Fails with `NotFound` if the session does not exist.
    async fn update(&self, session: &Session) -> Result<()>;

    /// Lists sessions for the member that have no completion timestamp.
    async fn list_pending_for_member(&self, member_id: &str) -> Result<Vec<Session>>;

    /// Lists completed sessions for the member.
    async fn list_completed_for_member(&self, member_id: &str) -> Result<Vec<Session>>;

    /// Lists every completed session, across members.
    async fn list_completed(&self) -> Result<Vec<Session>>;
}

/// Append-only storage for conversation turns.
#[async_trait]
pub trait TurnRepository: Send + Sync {
    /// Returns the session's turns in the order they were appended.
    ///
    /// A session without turns yields an empty list.
    async fn list(&self, session_id: &str) -> Result<Vec<ConversationTurn>>;

    /// Appends turns to the end of the session's history.
    async fn append(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<()>;
}
