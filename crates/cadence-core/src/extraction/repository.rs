//! Extracted record repository trait.

use super::record::StoredRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for extracted records, one per completed session.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Stores a record. Records are immutable apart from the merge mark:
    /// storing a second record for the same session fails.
    async fn save(&self, record: &StoredRecord) -> Result<()>;

    /// Stamps the session's record as merged.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session has no stored record
    async fn mark_merged(&self, session_id: &str, merged_at: DateTime<Utc>) -> Result<()>;

    /// Finds the record produced by a session.
    async fn find_by_session(&self, session_id: &str) -> Result<Option<StoredRecord>>;
}
