//! JSON-file directory store.
//!
//! Directory structure:
//! ```text
//! base_dir/
//! ├── members/<member-id>.json
//! ├── sessions/<session-id>.json
//! ├── turns/<session-id>.json       # array of turns, oldest first
//! ├── profiles/<member-id>.json
//! └── records/<session-id>.json
//! ```
//!
//! Every document is written atomically. Read-modify-write operations
//! (turn appends, versioned profile saves, create-only inserts) are
//! serialized by a process-wide write lock; the store assumes one writing
//! process per directory.

use crate::paths::CadencePaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use cadence_core::extraction::{RecordRepository, StoredRecord};
use cadence_core::member::{Member, MemberRepository};
use cadence_core::profile::{Profile, ProfileRepository};
use cadence_core::session::{ConversationTurn, Session, SessionRepository, TurnRepository};
use cadence_core::{CadenceError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const MEMBERS_DIR: &str = "members";
const SESSIONS_DIR: &str = "sessions";
const TURNS_DIR: &str = "turns";
const PROFILES_DIR: &str = "profiles";
const RECORDS_DIR: &str = "records";

pub struct FileStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `base_dir`.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        for dir in [MEMBERS_DIR, SESSIONS_DIR, TURNS_DIR, PROFILES_DIR, RECORDS_DIR] {
            fs::create_dir_all(base_dir.join(dir)).await?;
        }
        tracing::debug!("[FileStore] Opened store at {}", base_dir.display());

        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Opens the store in the default data directory.
    pub async fn default_location() -> Result<Self> {
        Self::new(CadencePaths::data_dir()?).await
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Inserts or replaces a member document.
    pub async fn upsert_member(&self, member: &Member) -> Result<()> {
        self.file(MEMBERS_DIR, &member.id).save(member).await
    }

    fn file<T>(&self, dir: &str, id: &str) -> AtomicJsonFile<T>
    where
        T: serde::Serialize + DeserializeOwned,
    {
        AtomicJsonFile::new(self.base_dir.join(dir).join(format!("{}.json", encode_id(id))))
    }

    /// Loads every document in `dir`.
    ///
    /// A document that fails to parse fails the whole listing, so callers
    /// never act on a partial view of the directory.
    async fn load_all<T>(&self, dir: &str) -> Result<Vec<T>>
    where
        T: serde::Serialize + DeserializeOwned,
    {
        let mut entries = fs::read_dir(self.base_dir.join(dir)).await?;
        let mut documents = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match AtomicJsonFile::<T>::new(path.clone()).load().await {
                Ok(Some(document)) => documents.push(document),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("[FileStore] Unreadable document {}: {}", path.display(), e);
                    return Err(e);
                }
            }
        }
        Ok(documents)
    }

    async fn sessions_where<F>(&self, predicate: F) -> Result<Vec<Session>>
    where
        F: Fn(&Session) -> bool,
    {
        let mut sessions: Vec<Session> = self
            .load_all::<Session>(SESSIONS_DIR)
            .await?
            .into_iter()
            .filter(|session| predicate(session))
            .collect();
        sessions.sort_by(|a, b| a.scheduled_for.cmp(&b.scheduled_for).then_with(|| a.id.cmp(&b.id)));
        Ok(sessions)
    }
}

/// Maps an identifier to a file-name-safe stem.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte is
/// written as `%XX`.
fn encode_id(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[async_trait]
impl MemberRepository for FileStore {
    async fn find_by_id(&self, member_id: &str) -> Result<Option<Member>> {
        self.file(MEMBERS_DIR, member_id).load().await
    }

    async fn list_active(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .load_all::<Member>(MEMBERS_DIR)
            .await?
            .into_iter()
            .filter(|member| member.is_active())
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(members)
    }
}

#[async_trait]
impl SessionRepository for FileStore {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        self.file(SESSIONS_DIR, session_id).load().await
    }

    async fn insert(&self, session: &Session) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let file = self.file::<Session>(SESSIONS_DIR, &session.id);
        if file.exists().await {
            return Err(CadenceError::invalid_state(format!(
                "session {} already exists",
                session.id
            )));
        }
        file.save(session).await
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let file = self.file::<Session>(SESSIONS_DIR, &session.id);
        if !file.exists().await {
            return Err(CadenceError::not_found("Session", &session.id));
        }
        file.save(session).await
    }

    async fn list_pending_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        self.sessions_where(|session| session.member_id == member_id && session.is_pending())
            .await
    }

    async fn list_completed_for_member(&self, member_id: &str) -> Result<Vec<Session>> {
        self.sessions_where(|session| session.member_id == member_id && session.is_completed())
            .await
    }

    async fn list_completed(&self) -> Result<Vec<Session>> {
        self.sessions_where(Session::is_completed).await
    }
}

#[async_trait]
impl TurnRepository for FileStore {
    async fn list(&self, session_id: &str) -> Result<Vec<ConversationTurn>> {
        Ok(self
            .file::<Vec<ConversationTurn>>(TURNS_DIR, session_id)
            .load()
            .await?
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turns: &[ConversationTurn]) -> Result<()> {
        if turns.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let file = self.file::<Vec<ConversationTurn>>(TURNS_DIR, session_id);
        let mut history = file.load().await?.unwrap_or_default();
        history.extend_from_slice(turns);
        file.save(&history).await
    }
}

#[async_trait]
impl ProfileRepository for FileStore {
    async fn find_by_member(&self, member_id: &str) -> Result<Option<Profile>> {
        self.file(PROFILES_DIR, member_id).load().await
    }

    async fn save(&self, profile: &Profile) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let file = self.file::<Profile>(PROFILES_DIR, &profile.member_id);
        let stored_version = file.load().await?.map(|stored| stored.version).unwrap_or(0);
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
        file.save(&next).await?;
        Ok(next.version)
    }
}

#[async_trait]
impl RecordRepository for FileStore {
    async fn save(&self, record: &StoredRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let file = self.file::<StoredRecord>(RECORDS_DIR, &record.session_id);
        if file.exists().await {
            return Err(CadenceError::invalid_state(format!(
                "session {} already has a stored record",
                record.session_id
            )));
        }
        file.save(record).await
    }

    async fn mark_merged(&self, session_id: &str, merged_at: DateTime<Utc>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let file = self.file::<StoredRecord>(RECORDS_DIR, session_id);
        let mut record = file
            .load()
            .await?
            .ok_or_else(|| CadenceError::not_found("Record", session_id))?;
        record.merged_at = Some(merged_at);
        file.save(&record).await
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<StoredRecord>> {
        self.file(RECORDS_DIR, session_id).load().await
    }
}
