use super::error::Error;
use entity::messages::{ActiveModel, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};

/// Inserts a private message from `sender_id` to `receiver_id`.
pub async fn create(
    db: &DatabaseConnection,
    sender_id: Id,
    receiver_id: Id,
    content: String,
) -> Result<Model, Error> {
    debug!("Creating message from {sender_id} to {receiver_id}");

    let active_model = ActiveModel {
        sender_id: Set(sender_id),
        receiver_id: Set(receiver_id),
        content: Set(content),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn create_returns_the_inserted_message() -> Result<(), Error> {
        let message_model = Model {
            id: 9,
            sender_id: 6,
            receiver_id: 7,
            content: "hello".to_owned(),
            created_at: chrono::Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![message_model.clone()]])
            .into_connection();

        let message = create(&db, 6, 7, "hello".to_owned()).await?;

        assert_eq!(message, message_model);

        Ok(())
    }
}
