//! Structured extraction from conversations.
//!
//! - `record`: typed, topic-specific records (`ExtractedRecord`)
//! - `validator`: best-effort parsing of model output into records
//! - `repository`: persistence of records produced by completed sessions

mod record;
mod repository;
pub mod validator;

pub use record::{
    BurnoutRisk, ExtractedRecord, FocusRecord, PainPointRecord, PulseRecord, RoleRecord,
    StoredRecord, WorkflowRecord, MAX_RATING, MIN_RATING,
};
pub use repository::RecordRepository;
pub use validator::{clamp_rating, validate};
