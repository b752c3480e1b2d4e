//! Thin persistence API over the `entity` crate.
//!
//! The real-time core only ever appends rows (comments, private messages and
//! notifications); reads and edits of these tables belong to the surrounding
//! CRUD application.

pub use entity::{comments, messages, notifications, Id};

pub mod comment;
pub mod error;
pub mod message;
pub mod notification;
