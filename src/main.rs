use domain::store::DbStore;
use log::*;
use realtime::{CommentRoom, Hub, PrivateRoom};
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting UniConnect [{}]...", config.runtime_env());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let store = Arc::new(DbStore::new(&db));
    let shutdown = CancellationToken::new();

    let (notification_queue, notification_worker) =
        notifications::channel(config.notification_queue_capacity);
    let worker_handle = notification_worker.spawn(store.clone(), shutdown.clone());

    let comment_hub = Hub::new(CommentRoom::new(store.clone()), shutdown.clone())
        .relay_unpersisted(config.relay_unpersisted_frames);
    let private_hub = Hub::new(
        PrivateRoom::new(store).with_notifications(notification_queue.clone()),
        shutdown.clone(),
    )
    .relay_unpersisted(config.relay_unpersisted_frames);

    let app_state = web::AppState::new(comment_hub, private_hub, notification_queue);

    tokio::spawn(cancel_on_signal(shutdown.clone()));

    if let Err(e) = web::init_server(&config, app_state, shutdown.clone()).await {
        error!("Server error: {e}");
    }

    // Covers the server failing on its own: stop the worker and live connections too
    shutdown.cancel();

    match timeout(config.shutdown_timeout(), worker_handle).await {
        Ok(Ok(())) => info!("Shutdown complete"),
        Ok(Err(e)) => error!("Notification worker failed: {e}"),
        Err(_) => warn!(
            "Notification worker did not stop within {}s, exiting anyway",
            config.shutdown_timeout_secs
        ),
    }
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {e}");
            return;
        }
    }
    shutdown.cancel();
}
