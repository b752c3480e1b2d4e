use super::error::Error;
use chrono::{DateTime, Utc};
use entity::notifications::{ActiveModel, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};

/// Inserts a notification for `user_id`, keeping the producer's timestamp.
pub async fn create(
    db: &DatabaseConnection,
    user_id: Id,
    message: String,
    created_at: DateTime<Utc>,
) -> Result<Model, Error> {
    debug!("Creating notification for user {user_id}");

    let active_model = ActiveModel {
        user_id: Set(user_id),
        message: Set(message),
        created_at: Set(created_at.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}
