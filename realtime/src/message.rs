use serde::{Deserialize, Serialize};

/// Integer id of a post, user or author as stored in the relational schema.
pub type Id = i32;

/// A comment posted into a post's comment room.
///
/// Received and relayed verbatim as `{"author_id": 5, "content": "hi"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentFrame {
    pub author_id: Id,
    pub content: String,
}

/// A direct message exchanged inside a private chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateFrame {
    pub sender_id: Id,
    pub receiver_id: Id,
    pub content: String,
}

/// Transport-agnostic view of one frame read from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(Vec<u8>),
    /// Ping and pong frames; answered by the transport itself.
    Control,
    Close,
}
