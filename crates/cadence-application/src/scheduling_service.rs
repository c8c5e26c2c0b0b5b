//! Scheduling service.
//!
//! Runs the cadence policy over every active member and creates the pending
//! sessions it selects. Members are independent: a failure for one member
//! is recorded in the pass report and the pass moves on.

use crate::Repositories;
use cadence_core::agent::AgentCode;
use cadence_core::config::SchedulerSettings;
use cadence_core::member::Member;
use cadence_core::schedule::{CadencePolicy, MemberSchedule};
use cadence_core::session::{Session, SessionSource};
use cadence_core::{CadenceError, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A member the pass could not schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberError {
    pub member_id: String,
    pub error: String,
}

/// Summary of one scheduling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingReport {
    /// Members examined
    pub processed: usize,
    pub sessions_created: usize,
    pub errors: Vec<MemberError>,
}

// Only one periodic scheduler per process.
static SCHEDULER_RUNNING: AtomicBool = AtomicBool::new(false);

pub struct SchedulingService {
    repositories: Repositories,
    policy: CadencePolicy,
    max_concurrency: usize,
}

impl SchedulingService {
    pub fn new(repositories: Repositories, settings: &SchedulerSettings) -> Self {
        Self {
            repositories,
            policy: CadencePolicy::from_settings(settings),
            max_concurrency: settings.max_concurrency.max(1),
        }
    }

    /// Runs one batch pass over all active members.
    ///
    /// Only listing the members can fail the whole pass; everything after
    /// that is isolated per member.
    pub async fn run_scheduling_pass(&self) -> Result<SchedulingReport> {
        let members = self.repositories.members.list_active().await?;
        let now = Utc::now();

        tracing::debug!(
            "[SchedulingService] Starting pass over {} members (concurrency {})",
            members.len(),
            self.max_concurrency
        );

        let outcomes: Vec<(Member, Vec<Session>, Result<()>)> = stream::iter(members)
            .map(|member| async move {
                let mut created = Vec::new();
                let outcome = self.create_due_sessions(&member, now, &mut created).await;
                (member, created, outcome)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut report = SchedulingReport {
            processed: outcomes.len(),
            ..Default::default()
        };
        for (member, created, outcome) in outcomes {
            report.sessions_created += created.len();
            if let Err(err) = outcome {
                tracing::warn!(
                    "[SchedulingService] Skipping member {}: {}",
                    member.id,
                    err
                );
                report.errors.push(MemberError {
                    member_id: member.id,
                    error: err.to_string(),
                });
            }
        }

        tracing::info!(
            "[SchedulingService] Pass complete: processed={}, sessions_created={}, errors={}",
            report.processed,
            report.sessions_created,
            report.errors.len()
        );
        Ok(report)
    }

    /// Plans and creates sessions for one member.
    pub async fn schedule_member(&self, member: &Member, now: DateTime<Utc>) -> Result<Vec<Session>> {
        let mut created = Vec::new();
        self.create_due_sessions(member, now, &mut created).await?;
        Ok(created)
    }

    /// Pushes each session onto `created` as soon as it is stored, so a
    /// later failure still leaves the earlier sessions accounted for.
    async fn create_due_sessions(
        &self,
        member: &Member,
        now: DateTime<Utc>,
        created: &mut Vec<Session>,
    ) -> Result<()> {
        let sessions = &self.repositories.sessions;
        let pending = sessions.list_pending_for_member(&member.id).await?;
        let completed = sessions.list_completed_for_member(&member.id).await?;
        let profile = self.repositories.profiles.find_by_member(&member.id).await?;

        let schedule = MemberSchedule::from_parts(member.seniority, profile.as_ref(), &pending, &completed);
        let plan = self.policy.plan(&schedule, now);
        if plan.selected.is_empty() {
            tracing::debug!("[SchedulingService] Nothing due for member {}", member.id);
            return Ok(());
        }

        // Another writer may have created a session since the first read.
        let pending_now: HashSet<AgentCode> = sessions
            .list_pending_for_member(&member.id)
            .await?
            .into_iter()
            .map(|session| session.agent_code)
            .collect();

        for code in plan.selected {
            if pending_now.contains(&code) {
                tracing::debug!(
                    "[SchedulingService] {} became pending for member {}, skipping",
                    code,
                    member.id
                );
                continue;
            }
            let session = Session::new(
                member.id.clone(),
                member.organization_id.clone(),
                code,
                SessionSource::Autopilot,
                now,
            );
            sessions.insert(&session).await?;
            tracing::info!(
                "[SchedulingService] Scheduled {} session {} for member {}",
                code,
                session.id,
                member.id
            );
            created.push(session);
        }
        Ok(())
    }

    /// Creates a manual session for a member, ignoring the cadence interval.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the member does not exist
    /// - `InvalidState` if the member is not active or already has a pending
    ///   session for the topic
    pub async fn schedule_manual(&self, member_id: &str, code: AgentCode) -> Result<Session> {
        let member = self
            .repositories
            .members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Member", member_id))?;
        if !member.is_active() {
            return Err(CadenceError::invalid_state(format!(
                "member {member_id} is not active"
            )));
        }

        let pending = self
            .repositories
            .sessions
            .list_pending_for_member(member_id)
            .await?;
        if let Some(existing) = pending.iter().find(|session| session.agent_code == code) {
            return Err(CadenceError::invalid_state(format!(
                "member {member_id} already has a pending {code} session ({})",
                existing.id
            )));
        }

        let session = Session::new(
            member.id,
            member.organization_id,
            code,
            SessionSource::Manual,
            Utc::now(),
        );
        self.repositories.sessions.insert(&session).await?;
        tracing::info!(
            "[SchedulingService] Manually scheduled {} session {} for member {}",
            code,
            session.id,
            member_id
        );
        Ok(session)
    }

    /// Starts the periodic scheduler.
    ///
    /// The pass runs immediately and then every `interval_secs` seconds.
    /// Returns `None` if a scheduler is already running in this process.
    pub fn start_scheduler(self: &Arc<Self>, interval_secs: u64) -> Option<JoinHandle<()>> {
        if SCHEDULER_RUNNING.swap(true, Ordering::SeqCst) {
            tracing::warn!("[Scheduler] Scheduler already running, skipping");
            return None;
        }

        let service = Arc::clone(self);
        let interval_secs = interval_secs.max(1);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            tracing::info!(target: "scheduler", "Scheduler started ({}s interval)", interval_secs);

            loop {
                ticker.tick().await;
                tracing::debug!(target: "scheduler", "Tick - running scheduling pass");

                if let Err(e) = service.run_scheduling_pass().await {
                    tracing::error!(target: "scheduler", "Scheduling pass failed: {}", e);
                }
            }
        }))
    }
}
