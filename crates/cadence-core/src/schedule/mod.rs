//! Scheduling policy.
//!
//! Pure decision logic: given what is known about one member, which topics
//! should be offered next. Storage access and session creation live in
//! `cadence-application::SchedulingService`.

mod policy;

pub use policy::{CadencePolicy, MemberSchedule, Skip, SkipReason, TopicPlan};
