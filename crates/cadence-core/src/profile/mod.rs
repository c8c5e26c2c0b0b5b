//! Profile domain module.
//!
//! - `model`: the cumulative per-member profile document
//! - `gaps`: derivation of `open_profile_gaps`
//! - `merge`: topic-specific reconciliation of extracted records
//! - `repository`: versioned persistence

mod gaps;
mod merge;
mod model;
mod repository;

pub use gaps::compute_gaps;
pub use merge::{merge, morale_trend, pain_trend};
pub use model::{
    CurrentFocus, GapField, GapPriority, MAX_PAIN_POINTS, MoraleSnapshot, MoraleTrend,
    PainPointEntry, PainTrend, Profile, ProfileGap, RoleSection, WorkflowEntry,
};
pub use repository::ProfileRepository;
