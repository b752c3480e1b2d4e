use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::Id;
use entity_api::{notification, notifications as notification_entity};
use notifications::{NotificationEvent, NotificationQueue};
use sea_orm::DatabaseConnection;

/// Validates a notification and hands it to the queue.
///
/// Returns `Ok(false)` when the queue is full and the notification was dropped.
pub fn submit(queue: &NotificationQueue, user_id: Id, message: &str) -> Result<bool, Error> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(
                "notification message must not be empty".to_string(),
            )),
        });
    }

    Ok(queue.enqueue(user_id, message))
}

/// Stores a drained notification, keeping the time it was submitted.
pub async fn create(
    db: &DatabaseConnection,
    event: &NotificationEvent,
) -> Result<notification_entity::Model, Error> {
    Ok(notification::create(
        db,
        event.recipient_user_id,
        event.message.clone(),
        event.created_at,
    )
    .await?)
}
