//! Member domain module.
//!
//! Members are owned by external membership management. The core only reads
//! them, through [`MemberRepository`].

mod model;
mod repository;

pub use model::{Member, MembershipStatus, Seniority};
pub use repository::MemberRepository;
