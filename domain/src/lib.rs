//! Domain layer for the UniConnect real-time core.
//!
//! Wraps the `entity_api` inserts behind the persistence contracts declared by
//! the `realtime` and `notifications` crates, so neither of those depends on
//! the database.
pub use entity_api::Id;

pub mod comment;
pub mod error;
pub mod message;
pub mod notification;
pub mod store;
