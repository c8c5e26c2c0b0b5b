//! In-memory implementation of every repository.
//!
//! Used by tests and by embedders that bring their own persistence. All
//! collections sit behind tokio `RwLock`s, so the store is cheap to share as
//! an `Arc`.

use async_trait::async_trait;
use cadence_core::extraction::{RecordRepository, StoredRecord};
use cadence_core::member::{Member, MemberRepository};
use cadence_core::profile::{Profile, ProfileRepository};
use cadence_core::session::{ConversationTurn, Session, SessionRepository, TurnRepository};
use cadence_core::{CadenceError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    members: RwLock<HashMap<String, Member>>,
    sessions: RwLock<HashMap<String, Session>>,
    turns: RwLock<HashMap<String, Vec<ConversationTurn>>>,
    profiles: RwLock<HashMap<String, Profile>>,
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a member.
    pub async fn upsert_member(&self, member: Member) {
        self.members.write().await.insert(member.id.clone(), member);
    }

    /// Every session, ordered by schedule time.
    pub async fn all_sessions(&self) -> Vec<Session> {
        sorted(self.sessions.read().await.values().cloned().collect())
    }
}

fn sorted(mut sessions: Vec<Session>) -> Vec<Session> {
    sessions.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for).then_with(|| a.id.cmp(&b.id)));
    sessions
}

#[async_trait]
impl MemberRepository for InMemoryStore {
    async fn find_by_id(&self, member_id: &str) -> Result<Option<Member>> {
        Ok(self.members.read().await.get(member_id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .members
            .read()
            .await
            .values()
            .filter(|member| member.is_active())
            .cloned()
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(members)
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn insert(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(CadenceError::invalid_state(format!(
                "session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(CadenceError::not_found("Session", &session.id)),
        }
    }

    async fn list_pending_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sorted(
            sessions
                .values()
                .filter(|session| session.member_id == member_id && session.is_pending())
                .cloned()
                .collect(),
        ))
    }

    async fn list_completed_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sorted(
            sessions
                .values()
                .filter(|session| session.member_id == member_id && session.is_completed())
                .cloned()
                .collect(),
        ))
    }

    async fn list_completed(&self) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sorted(
            sessions
                .values()
                .filter(|session| session.is_completed())
                .cloned()
                .collect(),
        ))
    }
}

#[async_trait]
impl TurnRepository for InMemoryStore {
    async fn list(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        Ok(self
            .turns
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<()> {
        self.turns
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .extend_from_slice(turns);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_member(&self, member_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.read().await.get(member_id).cloned())
    }

    async fn save(&self, profile: &Profile) -> Result<u64> {
        let mut profiles = self.profiles.write().await;
        let stored_version = profiles
            .get(&profile.member_id)
            .map(|stored| stored.version)
            .unwrap_or(0);
        if stored_version != profile.version {
            return Err(CadenceError::conflict(
                "Profile",
                &profile.member_id,
                profile.version,
                stored_version,
            ));
        }

        let mut next = profile.clone();
        next.version = stored_version + 1;
        let version = next.version;
        profiles.insert(next.member_id.clone(), next);
        Ok(version)
    }
}

#[async_trait]
impl RecordRepository for InMemoryStore {
    async fn save(&self, record: &StoredRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.session_id) {
            return Err(CadenceError::invalid_state(format!(
                "session {} already has a stored record",
                record.session_id
            )));
        }
        records.insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn mark_merged(&self, session_id: &str, merged_at: DateTime<Utc>) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(session_id)
            .ok_or_else(|| CadenceError::not_found("Record", session_id))?;
        record.merged_at = Some(merged_at);
        Ok(())
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<StoredRecord>> {
        Ok(self.records.read().await.get(session_id).cloned())
    }
}
