pub mod backfill;
pub mod context;
pub mod member;
pub mod schedule;
pub mod session;
