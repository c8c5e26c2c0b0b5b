//! Member repository trait.

use super::model::Member;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to organization members.
///
/// Membership CRUD lives outside the core; implementations only need to
/// answer point and filtered reads.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Finds a member by identity reference.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Member))`: Member found
    /// - `Ok(None)`: Member not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, member_id: &str) -> Result<Option<Member>>;

    /// Lists every member whose status is `active`, across organizations.
    async fn list_active(&self) -> Result<Vec<Member>>;
}
