//! Domain layer for cadence: members, sessions, topic agents, extracted
//! records, profiles and the scheduling policy.
//!
//! Everything in this crate is storage- and transport-agnostic. Persistence
//! is expressed as `async_trait` repository traits and the language model as
//! the [`provider::LlmProvider`] trait; concrete implementations live in
//! `cadence-infrastructure` and `cadence-interaction`.

pub mod agent;
pub mod config;
pub mod error;
pub mod extraction;
pub mod member;
pub mod profile;
pub mod provider;
pub mod schedule;
pub mod session;

pub use error::{CadenceError, Result};
