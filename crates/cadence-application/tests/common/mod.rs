//! Shared fixtures for the application tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cadence_application::Repositories;
use cadence_core::member::{Member, MembershipStatus, Seniority};
use cadence_core::profile::{Profile, ProfileRepository};
use cadence_core::provider::{CompletionRequest, LlmProvider, ProviderError};
use cadence_core::session::{Session, SessionRepository};
use cadence_core::{CadenceError, Result};
use cadence_infrastructure::InMemoryStore;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replays canned replies in order; fails once the script runs out.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::new(&[])
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Request {
                message: "connection refused".to_string(),
                is_retryable: true,
            })
    }
}

pub fn member(id: &str, name: &str, seniority: Seniority) -> Member {
    Member {
        id: id.to_string(),
        organization_id: "org-1".to_string(),
        display_name: name.to_string(),
        job_title: None,
        department_id: None,
        department_name: None,
        seniority,
        status: MembershipStatus::Active,
    }
}

/// A store holding Dana, an active individual contributor with id `m-1`.
pub async fn store_with_dana() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .upsert_member(member("m-1", "Dana Scully", Seniority::IndividualContributor))
        .await;
    store
}

/// Profile repository that reports a version conflict on the first
/// `conflicts` saves, then delegates.
pub struct ContendedProfiles {
    inner: Arc<InMemoryStore>,
    conflicts_left: AtomicUsize,
    saves: AtomicUsize,
}

impl ContendedProfiles {
    pub fn new(inner: Arc<InMemoryStore>, conflicts: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            conflicts_left: AtomicUsize::new(conflicts),
            saves: AtomicUsize::new(0),
        })
    }

    pub fn save_attempts(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepository for ContendedProfiles {
    async fn find_by_member(&self, member_id: &str) -> Result<Option<Profile>> {
        self.inner.find_by_member(member_id).await
    }

    async fn save(&self, profile: &Profile) -> Result<u64> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let left = self.conflicts_left.load(Ordering::SeqCst);
        if left > 0 {
            self.conflicts_left.store(left - 1, Ordering::SeqCst);
            return Err(CadenceError::conflict(
                "Profile",
                &profile.member_id,
                profile.version,
                profile.version + 1,
            ));
        }
        ProfileRepository::save(self.inner.as_ref(), profile).await
    }
}

/// Session repository that fails every read for one member.
pub struct BrokenMemberSessions {
    inner: Arc<InMemoryStore>,
    broken_member: String,
}

impl BrokenMemberSessions {
    pub fn new(inner: Arc<InMemoryStore>, broken_member: &str) -> Arc<Self> {
        Arc::new(Self {
            inner,
            broken_member: broken_member.to_string(),
        })
    }

    fn check(&self, member_id: &str) -> Result<()> {
        if member_id == self.broken_member {
            return Err(CadenceError::data_access(format!("sessions of {member_id} unreadable")));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for BrokenMemberSessions {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        SessionRepository::find_by_id(self.inner.as_ref(), session_id).await
    }

    async fn insert(&self, session: &Session) -> Result<()> {
        self.inner.insert(session).await
    }

    async fn update(&self, session: &Session) -> Result<()> {
        self.inner.update(session).await
    }

    async fn list_pending_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        self.check(member_id)?;
        self.inner.list_pending_for_member(member_id).await
    }

    async fn list_completed_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        self.check(member_id)?;
        self.inner.list_completed_for_member(member_id).await
    }

    async fn list_completed(&self) -> Result<Vec<Session>> {
        self.inner.list_completed().await
    }
}

/// Session repository whose inserts start failing after `allowed` successes.
pub struct LimitedInserts {
    inner: Arc<InMemoryStore>,
    allowed: usize,
    inserts: AtomicUsize,
}

impl LimitedInserts {
    pub fn new(inner: Arc<InMemoryStore>, allowed: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            allowed,
            inserts: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SessionRepository for LimitedInserts {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        SessionRepository::find_by_id(self.inner.as_ref(), session_id).await
    }

    async fn insert(&self, session: &Session) -> Result<()> {
        if self.inserts.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(CadenceError::data_access("session store is full"));
        }
        self.inner.insert(session).await
    }

    async fn update(&self, session: &Session) -> Result<()> {
        self.inner.update(session).await
    }

    async fn list_pending_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        self.inner.list_pending_for_member(member_id).await
    }

    async fn list_completed_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        self.inner.list_completed_for_member(member_id).await
    }

    async fn list_completed(&self) -> Result<Vec<Session>> {
        self.inner.list_completed().await
    }
}

pub fn repositories(store: &Arc<InMemoryStore>) -> Repositories {
    Repositories::from_store(store.clone())
}
