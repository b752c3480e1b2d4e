use crate::error::{Error, ErrorKind};
use crate::event::{NotificationEvent, UserId};
use log::*;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Producer side of the notification pipeline.
///
/// Cloning shares the same bounded buffer. No method ever awaits.
#[derive(Clone, Debug)]
pub struct NotificationQueue {
    sender: mpsc::Sender<NotificationEvent>,
}

impl NotificationQueue {
    pub(crate) fn new(sender: mpsc::Sender<NotificationEvent>) -> Self {
        Self { sender }
    }

    /// Submits a notification for `user_id`.
    ///
    /// Returns `true` if it was buffered. Returns `false` if the buffer was
    /// full or the worker has stopped; the notification is then lost.
    pub fn enqueue(&self, user_id: UserId, message: impl Into<String>) -> bool {
        match self.try_enqueue(NotificationEvent::new(user_id, message)) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping notification for user {user_id}: {e}");
                false
            }
        }
    }

    pub fn try_enqueue(&self, event: NotificationEvent) -> Result<(), Error> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => ErrorKind::QueueFull.into(),
            TrySendError::Closed(_) => ErrorKind::QueueClosed.into(),
        })
    }

    /// Total number of notifications the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Number of notifications currently buffered.
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
