use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use domain::Id;
use futures::{Sink, SinkExt, StreamExt};
use log::*;
use realtime::message::Inbound;
use realtime::room::Room;
use realtime::Hub;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

/// Upgrades a request into a member of the comment room for `post_id`.
pub(crate) async fn comments(
    Path(post_id): Path<Id>,
    State(app_state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    debug!("Upgrading connection for comments on post {post_id}");

    let hub = Arc::clone(&app_state.comment_hub);
    ws.on_upgrade(move |socket| serve_socket(hub, post_id, socket))
}

/// Upgrades a request into a member of the private chat room `chat_id`.
pub(crate) async fn private(
    Path(chat_id): Path<String>,
    State(app_state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    debug!("Upgrading connection for private chat {chat_id}");

    let hub = Arc::clone(&app_state.private_hub);
    ws.on_upgrade(move |socket| serve_socket(hub, chat_id, socket))
}

/// How long one frame may take to reach a peer before the connection is
/// treated as stalled and closed.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Splits the socket, spawns its writer, then runs the hub's receive loop
/// until the connection closes.
///
/// A writer that gives up also ends the receive loop, so a peer that stopped
/// reading leaves its room instead of piling up frames.
async fn serve_socket<R: Room>(hub: Arc<Hub<R>>, key: R::Key, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer_gone = CancellationToken::new();

    let writer = tokio::spawn({
        let writer_gone = writer_gone.clone();
        async move {
            let _guard = writer_gone.drop_guard();
            write_frames(sink, rx, WRITE_TIMEOUT).await;
        }
    });

    let inbound = stream
        .map(|frame| frame.map(into_inbound))
        .take_until(Box::pin(writer_gone.cancelled_owned()));
    hub.serve(key, inbound, tx).await;

    if let Err(e) = writer.await {
        warn!("WebSocket writer task failed: {e}");
    }
}

/// Forwards queued frames to the peer until every sender is gone, a write
/// fails, or a write takes longer than `write_timeout`.
async fn write_frames<S>(mut sink: S, mut rx: mpsc::UnboundedReceiver<String>, write_timeout: Duration)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(frame) = rx.recv().await {
        match timeout(write_timeout, sink.send(Message::Text(frame))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!("WebSocket write failed: {e}");
                break;
            }
            Err(_) => {
                warn!(
                    "WebSocket write stalled for {}s, closing connection",
                    write_timeout.as_secs_f32()
                );
                break;
            }
        }
    }

    if timeout(write_timeout, sink.close()).await.is_err() {
        debug!("WebSocket close did not complete in time");
    }
}

fn into_inbound(message: Message) -> Inbound {
    match message {
        Message::Text(text) => Inbound::Text(text),
        Message::Binary(bytes) => Inbound::Binary(bytes),
        Message::Ping(_) | Message::Pong(_) => Inbound::Control,
        Message::Close(_) => Inbound::Close,
    }
}
