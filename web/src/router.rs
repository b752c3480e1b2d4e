use crate::{
    controller::{health_check_controller, notification_controller},
    ws, AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "UniConnect Real-time API"
        ),
        paths(
            health_check_controller::health_check,
            notification_controller::create,
        ),
        components(
            schemas(
                notification_controller::NotificationRequest,
                notification_controller::NotificationReceipt,
            )
        ),
        tags(
            (name = "uniconnect", description = "UniConnect comments, chats and notifications")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(notification_routes(app_state.clone()))
        .merge(websocket_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", post(notification_controller::create))
        .with_state(app_state)
}

// Callers are authorized before they reach these routes
fn websocket_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/ws/comments/:post_id", get(ws::handler::comments))
        .route("/ws/private/:chat_id", get(ws::handler::private))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_state;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn notification_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/notifications")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_responds_ok() {
        let (state, _worker) = test_state(4);
        let response = define_routes(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn accepted_notification_returns_202() {
        let (state, _worker) = test_state(4);
        let queue = state.notification_queue.clone();

        let response = define_routes(state)
            .oneshot(notification_request(
                json!({"user_id": 1, "message": "New comment"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            json_body(response).await,
            json!({"status_code": 202, "data": {"accepted": true}})
        );
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn full_queue_returns_503() {
        let (state, _worker) = test_state(1);
        assert!(state.notification_queue.enqueue(9, "fills the queue"));

        let response = define_routes(state)
            .oneshot(notification_request(
                json!({"user_id": 1, "message": "dropped"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json_body(response).await,
            json!({"status_code": 503, "data": {"accepted": false}})
        );
    }

    #[tokio::test]
    async fn blank_notification_is_unprocessable() {
        let (state, _worker) = test_state(4);

        let response = define_routes(state)
            .oneshot(notification_request(json!({"user_id": 1, "message": " "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn non_integer_post_id_is_rejected_before_upgrade() {
        let (state, _worker) = test_state(4);
        let comment_hub = state.comment_hub.clone();

        let response = define_routes(state)
            .oneshot(
                Request::get("/ws/comments/not-a-number")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(comment_hub.registry().connection_count(), 0);
    }
}
