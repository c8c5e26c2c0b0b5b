//! Read-modify-write of member profiles.

use cadence_core::extraction::ExtractedRecord;
use cadence_core::profile::{Profile, ProfileRepository, merge};
use cadence_core::{CadenceError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Attempts made before a merge gives up on version conflicts.
pub const DEFAULT_MERGE_ATTEMPTS: usize = 3;

/// Applies extracted records to stored profiles.
///
/// The repository's version check serializes concurrent merges for the same
/// member; on conflict the profile is re-read and the record re-applied.
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    max_attempts: usize,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            max_attempts: DEFAULT_MERGE_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the stored profile, or an unsaved empty one.
    pub async fn load_or_empty(&self, member_id: &str) -> Result<Profile> {
        Ok(self
            .profiles
            .find_by_member(member_id)
            .await?
            .unwrap_or_else(|| Profile::empty(member_id)))
    }

    /// Merges `record` into the member's profile and persists it.
    ///
    /// Returns the profile as stored, with its new version.
    pub async fn apply(&self, member_id: &str, record: &ExtractedRecord) -> Result<Profile> {
        let mut last_conflict = None;

        for attempt in 1..=self.max_attempts {
            let current = self.load_or_empty(member_id).await?;
            let mut next = merge(&current, record, Utc::now());

            match self.profiles.save(&next).await {
                Ok(version) => {
                    next.version = version;
                    tracing::info!(
                        "[ProfileService] Merged {} record into profile of {} (version {})",
                        record.agent_code(),
                        member_id,
                        version
                    );
                    return Ok(next);
                }
                Err(err) if err.is_conflict() => {
                    tracing::debug!(
                        "[ProfileService] Version conflict for {} (attempt {}/{}): {}",
                        member_id,
                        attempt,
                        self.max_attempts,
                        err
                    );
                    last_conflict = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_conflict.unwrap_or_else(|| {
            CadenceError::internal(format!("profile merge for {member_id} made no attempt"))
        }))
    }
}

