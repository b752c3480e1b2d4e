use crate::error::Error;
use entity_api::{message, messages, Id};
use sea_orm::DatabaseConnection;

pub async fn create(
    db: &DatabaseConnection,
    sender_id: Id,
    receiver_id: Id,
    content: String,
) -> Result<messages::Model, Error> {
    Ok(message::create(db, sender_id, receiver_id, content).await?)
}
