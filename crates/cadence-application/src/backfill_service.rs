//! Recovery for sessions whose record never reached the profile.
//!
//! A session closes even when extraction or the merge step fails. Backfill
//! re-runs extraction over the stored transcript of sessions without a
//! record, and re-merges records that were stored but never merged.

use crate::conversation_engine::MergeStatus;
use crate::profile_service::ProfileService;
use crate::record_step::{merge_stored, store_and_merge};
use crate::Repositories;
use cadence_core::agent::{AgentContext, TopicAgent};
use cadence_core::config::ConversationSettings;
use cadence_core::provider::LlmProvider;
use cadence_core::{CadenceError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Summary of a `backfill_missing` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Completed sessions without a merged record
    pub examined: usize,
    /// Sessions whose record was stored and merged
    pub applied: usize,
    /// Sessions where extraction again produced nothing
    pub unextractable: usize,
    /// Sessions that failed, with the reason
    pub failures: Vec<(String, String)>,
}

pub struct BackfillService {
    repositories: Repositories,
    profile_service: Arc<ProfileService>,
    provider: Arc<dyn LlmProvider>,
    settings: ConversationSettings,
}

impl BackfillService {
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

    /// Merges one completed session's record into the profile.
    ///
    /// A stored but unmerged record is merged as is. Without a stored
    /// record, extraction is re-run over the transcript first.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session or its member does not exist
    /// - `InvalidState` if the session is still open or its record is
    ///   already merged
    pub async fn backfill_session(&self, session_id: &str) -> Result<MergeStatus> {
        let session = self
            .repositories
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Session", session_id))?;
        if !session.is_completed() {
            return Err(CadenceError::invalid_state(format!(
                "session {session_id} is still open"
            )));
        }
        if let Some(stored) = self.repositories.records.find_by_session(session_id).await? {
            if stored.is_merged() {
                return Err(CadenceError::invalid_state(format!(
                    "session {session_id} is already merged"
                )));
            }
            let status = merge_stored(
                self.repositories.records.as_ref(),
                &self.profile_service,
                &session,
                &stored,
            )
            .await;
            tracing::info!("[BackfillService] Re-merged session {}: {:?}", session_id, status);
            return Ok(status);
        }

        let member = self
            .repositories
            .members
            .find_by_id(&session.member_id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Member", &session.member_id))?;
        let profile = self
            .repositories
            .profiles
            .find_by_member(&session.member_id)
            .await?;
        let turns = self.repositories.turns.list(session_id).await?;
        let ctx = AgentContext::new(member, profile, turns).with_generation(self.settings.generation());

        let agent = session.agent_code.definition();
        let Some(record) = agent.extract(self.provider.as_ref(), &ctx).await else {
            tracing::warn!(
                "[BackfillService] Extraction produced no record for session {}",
                session_id
            );
            return Ok(MergeStatus::NotAttempted);
        };

        let status = store_and_merge(
            self.repositories.records.as_ref(),
            &self.profile_service,
            &session,
            record,
        )
        .await;
        tracing::info!("[BackfillService] Backfilled session {}: {:?}", session_id, status);
        Ok(status)
    }

    /// Backfills every completed session whose record is missing or unmerged.
    pub async fn backfill_missing(&self) -> Result<BackfillReport> {
        let completed = self.repositories.sessions.list_completed().await?;
        let mut report = BackfillReport::default();

        for session in completed {
            let stored = self.repositories.records.find_by_session(&session.id).await?;
            if stored.is_some_and(|stored| stored.is_merged()) {
                continue;
            }
            report.examined += 1;

            match self.backfill_session(&session.id).await {
                Ok(MergeStatus::Applied { .. }) => report.applied += 1,
                Ok(MergeStatus::NotAttempted) => report.unextractable += 1,
                Ok(MergeStatus::Failed { reason }) => report.failures.push((session.id, reason)),
                Err(err) => report.failures.push((session.id, err.to_string())),
            }
        }

        tracing::info!(
            "[BackfillService] Backfill complete: examined={}, applied={}, unextractable={}, failed={}",
            report.examined,
            report.applied,
            report.unextractable,
            report.failures.len()
        );
        Ok(report)
    }
}
