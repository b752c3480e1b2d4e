//! The two kinds of rooms a [`Hub`](crate::hub::Hub) can serve.
//!
//! A room kind decides how rooms are keyed, what a valid frame looks like, and
//! where a frame is persisted before it is relayed. Everything else about a
//! connection's life is shared.
use crate::error::Error;
use crate::message::{CommentFrame, Id, PrivateFrame};
use crate::store::{CommentStore, MessageStore};
use async_trait::async_trait;
use log::*;
use notifications::NotificationQueue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

#[async_trait]
pub trait Room: Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Display + Send + Sync + 'static;
    type Frame: Serialize + DeserializeOwned + Send + Sync;

    /// Short label used in log lines.
    const KIND: &'static str;

    async fn persist(&self, key: &Self::Key, frame: &Self::Frame) -> Result<(), Error>;
}

/// Comment rooms, one per post.
pub struct CommentRoom {
    store: Arc<dyn CommentStore>,
}

impl CommentRoom {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Room for CommentRoom {
    type Key = Id;
    type Frame = CommentFrame;

    const KIND: &'static str = "comments";

    async fn persist(&self, post_id: &Id, frame: &CommentFrame) -> Result<(), Error> {
        self.store
            .insert_comment(*post_id, frame.author_id, &frame.content)
            .await
    }
}

/// Private chat rooms, keyed by a chat id such as `"6_7"`.
///
/// Once a message is stored its receiver is also notified through the
/// notification queue, when one is attached.
pub struct PrivateRoom {
    store: Arc<dyn MessageStore>,
    notifications: Option<NotificationQueue>,
}

impl PrivateRoom {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            notifications: None,
        }
    }

    pub fn with_notifications(mut self, queue: NotificationQueue) -> Self {
        self.notifications = Some(queue);
        self
    }
}

#[async_trait]
impl Room for PrivateRoom {
    type Key = String;
    type Frame = PrivateFrame;

    const KIND: &'static str = "private";

    async fn persist(&self, chat_id: &String, frame: &PrivateFrame) -> Result<(), Error> {
        self.store
            .insert_message(frame.sender_id, frame.receiver_id, &frame.content)
            .await?;

        if let Some(queue) = &self.notifications {
            let accepted = queue.enqueue(
                frame.receiver_id,
                format!("New message from user {}", frame.sender_id),
            );
            if !accepted {
                debug!("Message notification for chat {chat_id} was dropped");
            }
        }

        Ok(())
    }
}
