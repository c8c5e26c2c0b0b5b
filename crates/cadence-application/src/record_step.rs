//! Persisting a completed session's record and merging it.

use crate::conversation_engine::MergeStatus;
use crate::profile_service::ProfileService;
use cadence_core::extraction::{ExtractedRecord, RecordRepository, StoredRecord};
use cadence_core::session::Session;
use chrono::Utc;

/// Stores the record for `session`, then merges it into the member's profile.
///
/// Failures are logged and reported in the returned status; they never undo
/// the session's completion.
pub(crate) async fn store_and_merge(
    records: &dyn RecordRepository,
    profile_service: &ProfileService,
    session: &Session,
    record: ExtractedRecord,
) -> MergeStatus {
    let stored = StoredRecord {
        session_id: session.id.clone(),
        member_id: session.member_id.clone(),
        record,
        extracted_at: Utc::now(),
        merged_at: None,
    };

    if let Err(err) = records.save(&stored).await {
        tracing::error!(
            "[RecordStep] Failed to store {} record for session {}: {}",
            session.agent_code,
            session.id,
            err
        );
        return MergeStatus::Failed {
            reason: err.to_string(),
        };
    }

    merge_stored(records, profile_service, session, &stored).await
}

/// Merges an already stored record and stamps it as merged.
pub(crate) async fn merge_stored(
    records: &dyn RecordRepository,
    profile_service: &ProfileService,
    session: &Session,
    stored: &StoredRecord,
) -> MergeStatus {
    let profile = match profile_service.apply(&session.member_id, &stored.record).await {
        Ok(profile) => profile,
        Err(err) => {
            tracing::error!(
                "[RecordStep] Failed to merge {} record of session {} into profile of {}: {}",
                session.agent_code,
                session.id,
                session.member_id,
                err
            );
            return MergeStatus::Failed {
                reason: err.to_string(),
            };
        }
    };

    // The profile already holds the merge; a lost mark only risks a repeat.
    if let Err(err) = records.mark_merged(&session.id, Utc::now()).await {
        tracing::error!(
            "[RecordStep] Merged session {} but could not mark its record: {}",
            session.id,
            err
        );
    }
    MergeStatus::Applied {
        version: profile.version,
    }
}
