use crate::agent::AgentCode;
use crate::config::{CadenceSettings, SchedulerSettings};
use crate::member::Seniority;
use crate::profile::{Profile, compute_gaps};
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Scheduling inputs for one member, derived from storage.
#[derive(Debug, Clone, Default)]
pub struct MemberSchedule {
    pub seniority: Seniority,
    /// Topics with a pending session
    pub pending: HashSet<AgentCode>,
    /// Latest completion per topic
    pub last_completed: HashMap<AgentCode, DateTime<Utc>>,
    /// Topics closing an open profile gap, in gap order
    pub gap_topics: Vec<AgentCode>,
}

impl MemberSchedule {
    /// Builds the schedule from a member's sessions and profile.
    ///
    /// A member without a profile is treated as having every gap open.
    pub fn from_parts(
        seniority: Seniority,
        profile: Option<&Profile>,
        pending: &[Session],
        completed: &[Session],
    ) -> Self {
        let gaps = match profile {
            Some(profile) => compute_gaps(profile),
            None => Profile::empty(String::new()).open_profile_gaps,
        };

        let mut last_completed: HashMap<AgentCode, DateTime<Utc>> = HashMap::new();
        for session in completed {
            let Some(completed_at) = session.completed_at else {
                continue;
            };
            last_completed
                .entry(session.agent_code)
                .and_modify(|latest| {
                    if completed_at > *latest {
                        *latest = completed_at;
                    }
                })
                .or_insert(completed_at);
        }

        Self {
            seniority,
            pending: pending
                .iter()
                .filter(|session| session.is_pending())
                .map(|session| session.agent_code)
                .collect(),
            last_completed,
            gap_topics: gaps.iter().map(|gap| gap.field.closing_agent()).collect(),
        }
    }
}

/// Why a topic was not scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A session for the topic is still pending
    Pending,
    /// The topic's minimum interval has not elapsed
    TooSoon,
    /// Eligible, but the per-member cap was reached
    OverCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skip {
    pub agent_code: AgentCode,
    pub reason: SkipReason,
}

/// Outcome of planning one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPlan {
    /// Topics to create sessions for, highest priority first
    pub selected: Vec<AgentCode>,
    pub skipped: Vec<Skip>,
}

/// Decides which topics a member should be offered.
#[derive(Debug, Clone)]
pub struct CadencePolicy {
    cadence: CadenceSettings,
    max_new_sessions_per_member: usize,
}

impl Default for CadencePolicy {
    fn default() -> Self {
        Self::from_settings(&SchedulerSettings::default())
    }
}

impl CadencePolicy {
    pub fn new(cadence: CadenceSettings, max_new_sessions_per_member: usize) -> Self {
        Self {
            cadence,
            max_new_sessions_per_member,
        }
    }

    pub fn from_settings(settings: &SchedulerSettings) -> Self {
        Self::new(settings.cadence, settings.max_new_sessions_per_member)
    }

    pub fn max_new_sessions_per_member(&self) -> usize {
        self.max_new_sessions_per_member
    }

    /// A topic is due if it was never completed, or if strictly more than
    /// its minimum interval has passed since the last completion.
    pub fn is_due(&self, schedule: &MemberSchedule, code: AgentCode, now: DateTime<Utc>) -> bool {
        match schedule.last_completed.get(&code) {
            None => true,
            Some(last) => now - *last > self.cadence.interval_for(schedule.seniority, code),
        }
    }

    /// Plans the topics to offer.
    ///
    /// Eligible topics are ordered so that those closing an open gap come
    /// first (in gap order), then never-completed topics, then the longest
    /// since completion, then the fixed [`AgentCode::ALL`] order. The result
    /// is capped at `max_new_sessions_per_member`.
    pub fn plan(&self, schedule: &MemberSchedule, now: DateTime<Utc>) -> TopicPlan {
        let mut plan = TopicPlan::default();
        let mut eligible = Vec::new();

        for code in AgentCode::ALL {
            if schedule.pending.contains(&code) {
                plan.skipped.push(Skip {
                    agent_code: code,
                    reason: SkipReason::Pending,
                });
            } else if !self.is_due(schedule, code, now) {
                plan.skipped.push(Skip {
                    agent_code: code,
                    reason: SkipReason::TooSoon,
                });
            } else {
                eligible.push(code);
            }
        }

        eligible.sort_by_key(|code| {
            let gap_rank = schedule
                .gap_topics
                .iter()
                .position(|gap_code| gap_code == code)
                .unwrap_or(usize::MAX);
            // None sorts before Some, so never-completed topics come first
            let last = schedule.last_completed.get(code).copied();
            (gap_rank, last, code.order())
        });

        for (rank, code) in eligible.into_iter().enumerate() {
            if rank < self.max_new_sessions_per_member {
                plan.selected.push(code);
            } else {
                plan.skipped.push(Skip {
                    agent_code: code,
                    reason: SkipReason::OverCap,
                });
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{RoleSection, WorkflowEntry};
    use crate::session::SessionSource;
    use chrono::Duration;

    fn completed(code: AgentCode, at: DateTime<Utc>) -> Session {
        let mut session = Session::new("m-1", "org-1", code, SessionSource::Autopilot, at);
        session.mark_completed(at).unwrap();
        session
    }

    fn pending(code: AgentCode) -> Session {
        Session::new("m-1", "org-1", code, SessionSource::Autopilot, Utc::now())
    }

    fn full_profile(now: DateTime<Utc>) -> Profile {
        let mut profile = Profile::empty("m-1");
        profile.role = Some(RoleSection {
            role_summary: "Runs month-end close".to_string(),
            primary_duties: Vec::new(),
            customer_facing: false,
            updated_at: now,
        });
        profile.main_workflows.push(WorkflowEntry {
            name: "Month-end close".to_string(),
            steps: Vec::new(),
            tools: Vec::new(),
            frequency: None,
            updated_at: now,
        });
        profile.open_profile_gaps = compute_gaps(&profile);
        profile
    }

    #[test]
    fn test_new_member_gets_role_mapper_first() {
        let schedule = MemberSchedule::from_parts(Seniority::IndividualContributor, None, &[], &[]);
        let plan = CadencePolicy::default().plan(&schedule, Utc::now());
        assert_eq!(plan.selected, vec![AgentCode::RoleMapper]);
        assert_eq!(
            plan.skipped.iter().filter(|skip| skip.reason == SkipReason::OverCap).count(),
            4
        );
    }

    #[test]
    fn test_pending_topic_is_suppressed() {
        let now = Utc::now();
        let profile = full_profile(now);
        // everything but pulse was done yesterday; pulse is already pending
        let done: Vec<Session> = [
            AgentCode::RoleMapper,
            AgentCode::WorkflowMapper,
            AgentCode::PainScanner,
            AgentCode::FocusTracker,
        ]
        .into_iter()
        .map(|code| completed(code, now - Duration::days(1)))
        .collect();
        let schedule = MemberSchedule::from_parts(
            Seniority::Manager,
            Some(&profile),
            &[pending(AgentCode::Pulse)],
            &done,
        );

        let plan = CadencePolicy::new(CadenceSettings::default(), 5).plan(&schedule, now);
        assert!(plan.selected.is_empty());
        assert!(plan.skipped.contains(&Skip {
            agent_code: AgentCode::Pulse,
            reason: SkipReason::Pending,
        }));
    }

    #[test]
    fn test_interval_depends_on_seniority() {
        let now = Utc::now();
        let done = vec![completed(AgentCode::Pulse, now - Duration::days(10))];

        let ic = MemberSchedule::from_parts(Seniority::IndividualContributor, None, &[], &done);
        let exec = MemberSchedule::from_parts(Seniority::Executive, None, &[], &done);
        let policy = CadencePolicy::default();

        assert!(policy.is_due(&ic, AgentCode::Pulse, now));
        assert!(!policy.is_due(&exec, AgentCode::Pulse, now));
    }

    #[test]
    fn test_exact_interval_is_not_yet_due() {
        let now = Utc::now();
        let done = vec![completed(AgentCode::Pulse, now - Duration::days(7))];
        let schedule = MemberSchedule::from_parts(Seniority::Unset, None, &[], &done);
        assert!(!CadencePolicy::default().is_due(&schedule, AgentCode::Pulse, now));
    }

    #[test]
    fn test_order_without_gaps() {
        let now = Utc::now();
        let mut profile = full_profile(now);
        profile.current_focus = Some(crate::profile::CurrentFocus {
            label: "Audit prep".to_string(),
            tags: Vec::new(),
            summary: None,
            updated_at: now,
        });
        profile.pain_points.push(crate::profile::PainPointEntry {
            description: "Slow VPN".to_string(),
            workflow_name: None,
            tool_name: Some("VPN".to_string()),
            rating: 2,
            trend: crate::profile::PainTrend::Worsening,
            updated_at: now,
        });
        profile.open_profile_gaps = compute_gaps(&profile);
        assert!(profile.open_profile_gaps.is_empty());

        let done = vec![
            completed(AgentCode::Pulse, now - Duration::days(8)),
            completed(AgentCode::PainScanner, now - Duration::days(40)),
            completed(AgentCode::FocusTracker, now - Duration::days(20)),
        ];
        let schedule = MemberSchedule::from_parts(Seniority::IndividualContributor, Some(&profile), &[], &done);
        let plan = CadencePolicy::new(CadenceSettings::default(), 5).plan(&schedule, now);

        assert_eq!(
            plan.selected,
            vec![
                AgentCode::RoleMapper,
                AgentCode::WorkflowMapper,
                AgentCode::PainScanner,
                AgentCode::FocusTracker,
                AgentCode::Pulse,
            ]
        );
    }

    #[test]
    fn test_latest_completion_wins() {
        let now = Utc::now();
        let done = vec![
            completed(AgentCode::Pulse, now - Duration::days(30)),
            completed(AgentCode::Pulse, now - Duration::days(2)),
        ];
        let schedule = MemberSchedule::from_parts(Seniority::IndividualContributor, None, &[], &done);
        assert_eq!(schedule.last_completed[&AgentCode::Pulse], now - Duration::days(2));
        assert!(!CadencePolicy::default().is_due(&schedule, AgentCode::Pulse, now));
    }
}
