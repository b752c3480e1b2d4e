use chrono::{DateTime, Utc};

/// Integer user id as stored in the relational schema.
pub type UserId = i32;

/// A notification waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub recipient_user_id: UserId,
    pub message: String,
    /// Stamped when the producer submits the notification.
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(recipient_user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            recipient_user_id,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}
