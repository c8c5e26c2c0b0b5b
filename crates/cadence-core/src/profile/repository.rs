//! Profile repository trait.

use super::model::Profile;
use crate::error::Result;
use async_trait::async_trait;

/// Versioned persistence for profiles.
///
/// Concurrent merges for the same member are serialized by an optimistic
/// version check: a save only succeeds if nobody saved in between.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile owned by a member.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Profile))`: Profile found
    /// - `Ok(None)`: The member has no profile yet
    /// - `Err(_)`: Error occurred during retrieval (including malformed documents)
    async fn find_by_member(&self, member_id: &str) -> Result<Option<Profile>>;

    /// Saves a profile.
    ///
    /// `profile.version` must equal the currently stored version (0 when the
    /// member has no stored profile). On success the stored version is
    /// incremented and returned.
    ///
    /// # Errors
    ///
    /// Returns `CadenceError::Conflict` if the stored version moved on.
    async fn save(&self, profile: &Profile) -> Result<u64>;
}
