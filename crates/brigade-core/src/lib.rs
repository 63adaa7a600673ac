//! Brigade Core — domain models, repository traits, and the
//! position-hierarchy algorithms shared by every other crate.

pub mod context;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod repository;
pub mod slug;
pub mod training;
