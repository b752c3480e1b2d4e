//! Database-backed implementation of the hub and worker persistence contracts.
use crate::{comment, message, notification, Id};
use async_trait::async_trait;
use log::*;
use notifications::{error::Error as NotificationError, NotificationEvent, NotificationStore};
use realtime::error::Error as RealtimeError;
use realtime::store::{CommentStore, MessageStore};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Writes comments, private messages and notifications to Postgres.
#[derive(Clone)]
pub struct DbStore {
    db: Arc<DatabaseConnection>,
}

impl DbStore {
    pub fn new(db: &Arc<DatabaseConnection>) -> Self {
        Self { db: Arc::clone(db) }
    }
}

#[async_trait]
impl CommentStore for DbStore {
    async fn insert_comment(
        &self,
        post_id: Id,
        author_id: Id,
        content: &str,
    ) -> Result<(), RealtimeError> {
        let comment = comment::create(&self.db, post_id, author_id, content.to_owned())
            .await
            .map_err(RealtimeError::persistence)?;
        trace!("Stored comment {} on post {post_id}", comment.id);
        Ok(())
    }
}

#[async_trait]
impl MessageStore for DbStore {
    async fn insert_message(
        &self,
        sender_id: Id,
        receiver_id: Id,
        content: &str,
    ) -> Result<(), RealtimeError> {
        let message = message::create(&self.db, sender_id, receiver_id, content.to_owned())
            .await
            .map_err(RealtimeError::persistence)?;
        trace!("Stored message {}", message.id);
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for DbStore {
    async fn insert_notification(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        notification::create(&self.db, event)
            .await
            .map_err(NotificationError::persistence)?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity_api::{comments, notifications as notification_entity};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};

    #[tokio::test]
    async fn insert_comment_writes_through_entity_api() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![comments::Model {
                id: 1,
                post_id: 42,
                author_id: 5,
                content: "hi".to_owned(),
                created_at: chrono::Utc::now().into(),
            }]])
            .into_connection();
        let store = DbStore::new(&Arc::new(db));

        assert!(store.insert_comment(42, 5, "hi").await.is_ok());
    }

    #[tokio::test]
    async fn insert_message_failure_is_a_persistence_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_owned(),
            ))])
            .into_connection();
        let store = DbStore::new(&Arc::new(db));

        let err = store.insert_message(6, 7, "hey").await.unwrap_err();

        assert_eq!(err.error_kind, realtime::error::ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn insert_notification_keeps_event_fields() {
        let event = NotificationEvent::new(3, "New comment");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![notification_entity::Model {
                id: 10,
                user_id: event.recipient_user_id,
                message: event.message.clone(),
                created_at: event.created_at.into(),
            }]])
            .into_connection();
        let store = DbStore::new(&Arc::new(db));

        assert!(store.insert_notification(&event).await.is_ok());
    }
}
