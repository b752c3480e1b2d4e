use crate::connection::{Connection, ConnectionRegistry};
use crate::error::{Error, ErrorKind};
use crate::message::Inbound;
use crate::room::Room;
use futures::{Stream, StreamExt};
use log::*;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Relays frames between the members of every room of one kind.
///
/// Each connection runs [`Hub::serve`] on its own task. A frame read from a
/// connection is validated, persisted, and then written to every member of
/// the room at that moment, the sender included.
pub struct Hub<R: Room> {
    room: R,
    registry: Arc<ConnectionRegistry<R::Key>>,
    relay_unpersisted: bool,
    shutdown: CancellationToken,
}

impl<R: Room> Hub<R> {
    pub fn new(room: R, shutdown: CancellationToken) -> Self {
        Self {
            room,
            registry: Arc::new(ConnectionRegistry::new()),
            relay_unpersisted: true,
            shutdown,
        }
    }

    /// Whether a frame that failed to persist is still relayed to the room.
    /// Defaults to `true`.
    pub fn relay_unpersisted(mut self, relay: bool) -> Self {
        self.relay_unpersisted = relay;
        self
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry<R::Key>> {
        &self.registry
    }

    /// Runs one connection from registration until it closes.
    ///
    /// `inbound` is the read half of an already upgraded transport and
    /// `outbound` feeds its writer. The connection leaves the room when the
    /// transport ends, errors, sends a close frame, or the hub shuts down.
    pub async fn serve<S, E>(&self, key: R::Key, mut inbound: S, outbound: UnboundedSender<String>)
    where
        S: Stream<Item = Result<Inbound, E>> + Unpin + Send,
        E: Display + Send,
    {
        let connection = Connection::new(outbound);
        let connection_id = connection.id().clone();

        if !self.registry.join(&key, connection) {
            return;
        }
        debug!(
            "Connection {} registered in {} room {key}",
            connection_id.as_str(),
            R::KIND
        );

        loop {
            let next = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("Closing connection {} for shutdown", connection_id.as_str());
                    break;
                }
                next = inbound.next() => next,
            };

            match next {
                Some(Ok(Inbound::Text(text))) => self.relay(&key, &text).await,
                Some(Ok(Inbound::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => self.relay(&key, &text).await,
                    Err(e) => warn!(
                        "Dropping non UTF-8 frame in {} room {key}: {}",
                        R::KIND,
                        Error::new(ErrorKind::MalformedFrame, e)
                    ),
                },
                Some(Ok(Inbound::Control)) => continue,
                Some(Ok(Inbound::Close)) | None => break,
                Some(Err(e)) => {
                    debug!(
                        "Connection {} read failed: {}",
                        connection_id.as_str(),
                        Error::new(ErrorKind::Transport, e.to_string())
                    );
                    break;
                }
            }
        }

        self.registry.leave(&key, &connection_id);
        debug!(
            "Connection {} closed in {} room {key}",
            connection_id.as_str(),
            R::KIND
        );
    }

    /// Validates, persists, then broadcasts one text frame.
    ///
    /// Malformed frames are dropped and the connection stays open.
    async fn relay(&self, key: &R::Key, text: &str) {
        let frame: R::Frame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    "Dropping frame in {} room {key}: {}",
                    R::KIND,
                    Error::from(e)
                );
                return;
            }
        };

        if let Err(e) = self.room.persist(key, &frame).await {
            if self.relay_unpersisted {
                warn!("Relaying unpersisted frame in {} room {key}: {e}", R::KIND);
            } else {
                warn!("Not relaying unpersisted frame in {} room {key}: {e}", R::KIND);
                return;
            }
        }

        match serde_json::to_string(&frame) {
            Ok(payload) => {
                self.broadcast(key, payload);
            }
            Err(e) => error!("Failed to serialize {} frame: {e}", R::KIND),
        }
    }

    /// Writes `payload` to every current member of the room.
    ///
    /// Returns the number of members the frame was handed to.
    pub fn broadcast(&self, key: &R::Key, payload: String) -> usize {
        let members = self.registry.snapshot(key);
        let mut delivered = 0;

        for member in &members {
            match member.send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => warn!(
                    "Dropping frame for connection {}, its writer is already gone",
                    member.id().as_str()
                ),
            }
        }

        trace!(
            "Broadcast to {delivered}/{} member(s) of {} room {key}",
            members.len(),
            R::KIND
        );
        delivered
    }
}
