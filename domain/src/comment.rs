use crate::error::Error;
use entity_api::{comment, comments, Id};
use sea_orm::DatabaseConnection;

pub async fn create(
    db: &DatabaseConnection,
    post_id: Id,
    author_id: Id,
    content: String,
) -> Result<comments::Model, Error> {
    Ok(comment::create(db, post_id, author_id, content).await?)
}
