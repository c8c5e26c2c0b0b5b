//! Conversation engine.
//!
//! Drives one session at a time: the full turn history is re-read from the
//! store on every call, the topic agent runs against it, and new turns are
//! appended. No conversation state is kept in process, so callers only need
//! to serialize turns per session.

use crate::profile_service::ProfileService;
use crate::record_step::store_and_merge;
use crate::Repositories;
use cadence_core::agent::{AgentContext, TopicAgent};
use cadence_core::config::ConversationSettings;
use cadence_core::extraction::ExtractedRecord;
use cadence_core::member::Member;
use cadence_core::provider::LlmProvider;
use cadence_core::session::{ConversationState, ConversationTurn, Session, TurnRole, count_user_turns};
use cadence_core::{CadenceError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What happened to the profile after a session completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MergeStatus {
    /// The session is still open, or extraction produced no record
    NotAttempted,
    /// The record was stored and merged; the profile is now at `version`
    Applied { version: u64 },
    /// Storing or merging failed; the session stays closed
    Failed { reason: String },
}

/// Result of opening a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningResult {
    pub session_id: String,
    pub message: String,
    /// True when the opening already existed and was returned as-is
    pub resumed: bool,
}

/// Result of one user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub session_id: String,
    pub message: String,
    pub is_complete: bool,
    pub state: ConversationState,
    pub extracted: Option<ExtractedRecord>,
    pub merge: MergeStatus,
    pub used_fallback: bool,
}

/// Runs conversations against stored sessions.
pub struct ConversationEngine {
    repositories: Repositories,
    profile_service: Arc<ProfileService>,
    provider: Arc<dyn LlmProvider>,
    settings: ConversationSettings,
}

impl ConversationEngine {
    pub fn new(
        repositories: Repositories,
        profile_service: Arc<ProfileService>,
        provider: Arc<dyn LlmProvider>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            repositories,
            profile_service,
            provider,
            settings,
        }
    }

    /// Produces (or returns the existing) opening message of a session.
    ///
    /// The first open stamps `started_at`. Opening is idempotent: a session
    /// that already has turns returns its first assistant turn.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session or its member does not exist
    /// - `InvalidState` if the session is already completed
    pub async fn open_session(&self, session_id: &str) -> Result<OpeningResult> {
        let mut session = self.load_session(session_id).await?;
        if session.is_completed() {
            return Err(CadenceError::invalid_state(format!(
                "session {session_id} is already completed"
            )));
        }

        let history = self.repositories.turns.list(session_id).await?;
        if let Some(opening) = history.iter().find(|turn| turn.role == TurnRole::Assistant) {
            tracing::debug!("[ConversationEngine] Session {} already opened", session_id);
            return Ok(OpeningResult {
                session_id: session_id.to_string(),
                message: opening.content.clone(),
                resumed: true,
            });
        }

        let ctx = self.build_context(&session, history).await?;
        let agent = session.agent_code.definition();
        let message = agent.opening_message(self.provider.as_ref(), &ctx).await;

        self.repositories
            .turns
            .append(session_id, &[ConversationTurn::assistant(message.clone())])
            .await?;

        if session.mark_started(Utc::now()) {
            self.repositories.sessions.update(&session).await?;
        }

        tracing::info!(
            "[ConversationEngine] Opened {} session {} for member {}",
            session.agent_code,
            session_id,
            session.member_id
        );

        Ok(OpeningResult {
            session_id: session_id.to_string(),
            message,
            resumed: false,
        })
    }

    /// Records a user message and produces the assistant's reply.
    ///
    /// When the message brings the conversation to its completion threshold
    /// the session is closed, the extracted record (if any) is stored and
    /// merged, and the merge outcome is reported in [`TurnResult::merge`].
    ///
    /// # Errors
    ///
    /// - `Validation` if the message is blank
    /// - `NotFound` if the session or its member does not exist
    /// - `InvalidState` if the session is closed or was never opened
    pub async fn advance_session(&self, session_id: &str, user_message: &str) -> Result<TurnResult> {
        if user_message.trim().is_empty() {
            return Err(CadenceError::validation("user message must not be blank"));
        }

        let mut session = self.load_session(session_id).await?;
        let history = self.repositories.turns.list(session_id).await?;
        let min_user_turns = self.settings.min_user_turns_for(session.agent_code);

        let state = ConversationState::derive(
            session.is_completed(),
            count_user_turns(&history),
            min_user_turns,
        );
        if !state.accepts_user_turns() {
            return Err(CadenceError::invalid_state(format!(
                "session {session_id} is closed"
            )));
        }
        if history.is_empty() {
            return Err(CadenceError::invalid_state(format!(
                "session {session_id} has not been opened"
            )));
        }

        let mut ctx = self.build_context(&session, history).await?;
        let before = ctx.turns.len();
        let agent = session.agent_code.definition();
        let outcome = agent
            .advance_turn(self.provider.as_ref(), &mut ctx, user_message)
            .await;

        self.repositories
            .turns
            .append(session_id, &ctx.turns[before..])
            .await?;

        if !outcome.is_complete {
            let state = ConversationState::derive(false, ctx.user_turn_count(), min_user_turns);
            tracing::debug!(
                "[ConversationEngine] Session {} advanced ({} user turns)",
                session_id,
                ctx.user_turn_count()
            );
            return Ok(TurnResult {
                session_id: session_id.to_string(),
                message: outcome.message,
                is_complete: false,
                state,
                extracted: None,
                merge: MergeStatus::NotAttempted,
                used_fallback: outcome.used_fallback,
            });
        }

        session.mark_completed(Utc::now())?;
        self.repositories.sessions.update(&session).await?;
        tracing::info!(
            "[ConversationEngine] Completed {} session {} for member {}",
            session.agent_code,
            session_id,
            session.member_id
        );

        let merge = match outcome.extracted.clone() {
            Some(record) => {
                store_and_merge(
                    self.repositories.records.as_ref(),
                    &self.profile_service,
                    &session,
                    record,
                )
                .await
            }
            None => {
                tracing::warn!(
                    "[ConversationEngine] Session {} closed without an extracted record",
                    session_id
                );
                MergeStatus::NotAttempted
            }
        };

        Ok(TurnResult {
            session_id: session_id.to_string(),
            message: outcome.message,
            is_complete: true,
            state: ConversationState::Closed,
            extracted: outcome.extracted,
            merge,
            used_fallback: outcome.used_fallback,
        })
    }

    /// Current conversation state of a session.
    pub async fn session_state(&self, session_id: &str) -> Result<ConversationState> {
        let session = self.load_session(session_id).await?;
        let history = self.repositories.turns.list(session_id).await?;
        Ok(ConversationState::derive(
            session.is_completed(),
            count_user_turns(&history),
            self.settings.min_user_turns_for(session.agent_code),
        ))
    }

    async fn load_session(&self, session_id: &str) -> Result<Session> {
        self.repositories
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Session", session_id))
    }

    async fn load_member(&self, member_id: &str) -> Result<Member> {
        self.repositories
            .members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Member", member_id))
    }

    async fn build_context(
        &self,
        session: &Session,
        history: Vec<ConversationTurn>,
    ) -> Result<AgentContext> {
        let member = self.load_member(&session.member_id).await?;
        let profile = self
            .repositories
            .profiles
            .find_by_member(&session.member_id)
            .await?;

        Ok(AgentContext::new(member, profile, history)
            .with_min_user_turns(self.settings.min_user_turns_for(session.agent_code))
            .with_generation(self.settings.generation()))
    }
}
