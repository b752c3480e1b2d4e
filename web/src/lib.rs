use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use log::*;
use notifications::NotificationQueue;
use realtime::{CommentRoom, Hub, PrivateRoom};
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use error::{Error, Result};

mod controller;
mod error;
pub mod router;
mod ws;

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub comment_hub: Arc<Hub<CommentRoom>>,
    pub private_hub: Arc<Hub<PrivateRoom>>,
    pub notification_queue: NotificationQueue,
}

impl AppState {
    pub fn new(
        comment_hub: Hub<CommentRoom>,
        private_hub: Hub<PrivateRoom>,
        notification_queue: NotificationQueue,
    ) -> Self {
        Self {
            comment_hub: Arc::new(comment_hub),
            private_hub: Arc::new(private_hub),
            notification_queue,
        }
    }
}

/// Serves the API until `shutdown` is cancelled.
pub async fn init_server(
    config: &Config,
    app_state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(allowed_origins));

    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let listener = TcpListener::bind((interface, config.port)).await?;

    info!(
        "Server starting... listening for connections on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
