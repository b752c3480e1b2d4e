use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::controller::ApiResponse;
use crate::{AppState, Error};
use domain::{notification as NotificationApi, Id};
use log::*;

/// Request body for submitting a notification.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationRequest {
    /// Recipient of the notification
    pub user_id: Id,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationReceipt {
    /// False when the notification queue was full and the notification was dropped
    pub accepted: bool,
}

/// POST submit a notification for asynchronous delivery
#[utoipa::path(
    post,
    path = "/notifications",
    request_body = NotificationRequest,
    responses(
        (status = 202, description = "Notification queued for delivery", body = NotificationReceipt),
        (status = 422, description = "Unprocessable Entity"),
        (status = 503, description = "Notification queue is full, notification dropped", body = NotificationReceipt)
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Submit notification for user {}", request.user_id);

    let accepted = NotificationApi::submit(
        &app_state.notification_queue,
        request.user_id,
        &request.message,
    )?;

    let status = if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((
        status,
        Json(ApiResponse::new(
            status.into(),
            NotificationReceipt { accepted },
        )),
    ))
}
