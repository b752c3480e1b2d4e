use super::error::Error;
use entity::comments::{ActiveModel, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};

/// Inserts a comment authored by `author_id` under post `post_id`.
pub async fn create(
    db: &DatabaseConnection,
    post_id: Id,
    author_id: Id,
    content: String,
) -> Result<Model, Error> {
    debug!("Creating comment on post {post_id} by author {author_id}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        post_id: Set(post_id),
        author_id: Set(author_id),
        content: Set(content),
        created_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}
