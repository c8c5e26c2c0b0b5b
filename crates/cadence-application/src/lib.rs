//! Application layer for cadence.
//!
//! This crate provides the use cases that coordinate the domain layer with
//! storage and the language-model provider: running conversations, merging
//! their records into profiles, scheduling new sessions and recovering
//! sessions that closed without a stored record.

pub mod backfill_service;
pub mod conversation_engine;
pub mod profile_service;
pub mod scheduling_service;

mod record_step;

pub use backfill_service::{BackfillReport, BackfillService};
pub use conversation_engine::{ConversationEngine, MergeStatus, OpeningResult, TurnResult};
pub use profile_service::ProfileService;
pub use scheduling_service::{MemberError, SchedulingReport, SchedulingService};

use cadence_core::extraction::RecordRepository;
use cadence_core::member::MemberRepository;
use cadence_core::profile::ProfileRepository;
use cadence_core::session::{SessionRepository, TurnRepository};
use std::sync::Arc;

/// The repositories the use cases read from and write to.
#[derive(Clone)]
pub struct Repositories {
    pub members: Arc<dyn MemberRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub turns: Arc<dyn TurnRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub records: Arc<dyn RecordRepository>,
}

impl Repositories {
    /// Uses one store for every repository.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: MemberRepository
            + SessionRepository
            + TurnRepository
            + ProfileRepository
            + RecordRepository
            + 'static,
    {
        Self {
            members: store.clone(),
            sessions: store.clone(),
            turns: store.clone(),
            profiles: store.clone(),
            records: store,
        }
    }
}
