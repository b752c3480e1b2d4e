pub mod comments;
pub mod messages;
pub mod notifications;

/// A type alias that represents any Entity's internal id field data type.
/// Posts, users and chats are keyed by integer ids in the relational store.
pub type Id = i32;
