//! Persistence contracts the hubs write through before relaying a frame.
use crate::error::Error;
use crate::message::Id;
use async_trait::async_trait;

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, post_id: Id, author_id: Id, content: &str)
        -> Result<(), Error>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(
        &self,
        sender_id: Id,
        receiver_id: Id,
        content: &str,
    ) -> Result<(), Error>;
}
