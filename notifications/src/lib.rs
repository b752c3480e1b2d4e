//! Asynchronous notification delivery for UniConnect.
//!
//! Producers (HTTP handlers, the private chat hub) hand notifications to a
//! bounded in-memory queue and return immediately. A single background worker
//! drains the queue in arrival order and writes each notification through a
//! [`NotificationStore`].
//!
//! # Architecture
//!
//! - **Drop on full**: [`NotificationQueue::enqueue`] never waits. When the
//!   buffer is at capacity the notification is discarded and `false` is
//!   returned to the producer.
//! - **Single consumer**: [`channel`] hands out exactly one
//!   [`NotificationWorker`], which owns the only receiving end. Processing
//!   order is therefore the order in which notifications were accepted.
//! - **Best effort**: a notification that fails to persist is logged and lost.
//!   There is no retry and no requeue.
//! - **Cooperative shutdown**: the worker observes a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken) between
//!   notifications. Whatever is still buffered at that point is not drained.
//!
//! This crate has no dependencies on internal crates, so the domain layer can
//! implement [`NotificationStore`] without a dependency cycle.

use async_trait::async_trait;
use tokio::sync::mpsc;

pub mod error;
pub mod event;
pub mod queue;
pub mod worker;

pub use event::{NotificationEvent, UserId};
pub use queue::NotificationQueue;
pub use worker::NotificationWorker;

/// Persistence sink for notifications drained by the worker.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, event: &NotificationEvent) -> Result<(), error::Error>;
}

/// Creates a queue bounded at `capacity` together with its only worker.
///
/// The queue handle is cheap to clone and can be shared with every producer.
/// The worker must be spawned exactly once; dropping it closes the queue and
/// every subsequent enqueue is refused.
pub fn channel(capacity: usize) -> (NotificationQueue, NotificationWorker) {
    // tokio panics on a zero sized channel
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        NotificationQueue::new(sender),
        NotificationWorker::new(receiver),
    )
}
