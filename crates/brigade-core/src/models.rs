//! Domain models for Brigade.
//!
//! These are the core types shared across all crates.

pub mod channel;
pub mod course;
pub mod department;
pub mod membership;
pub mod organization;
pub mod position;
pub mod user;
