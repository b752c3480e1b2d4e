use crate::event::NotificationEvent;
use crate::NotificationStore;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Consumer side of the notification pipeline. Exactly one exists per queue.
pub struct NotificationWorker {
    receiver: mpsc::Receiver<NotificationEvent>,
}

impl NotificationWorker {
    pub(crate) fn new(receiver: mpsc::Receiver<NotificationEvent>) -> Self {
        Self { receiver }
    }

    /// Starts draining the queue on a background task.
    ///
    /// The returned handle completes once `shutdown` is cancelled (after the
    /// notification in flight, if any, has been written) or once every queue
    /// handle has been dropped.
    pub fn spawn(
        self,
        store: Arc<dyn NotificationStore>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(store, shutdown))
    }

    pub async fn run(mut self, store: Arc<dyn NotificationStore>, shutdown: CancellationToken) {
        info!("Notification worker started");

        loop {
            let event = tokio::select! {
                // Checked first so that a pending cancellation wins over a full buffer.
                biased;
                _ = shutdown.cancelled() => {
                    let abandoned = self.receiver.len();
                    if abandoned > 0 {
                        warn!("Notification worker stopping with {abandoned} notification(s) undelivered");
                    }
                    break;
                }
                event = self.receiver.recv() => match event {
                    Some(event) => event,
                    None => {
                        debug!("All notification queue handles dropped");
                        break;
                    }
                },
            };

            Self::persist(store.as_ref(), event).await;
        }

        info!("Notification worker stopped");
    }

    async fn persist(store: &dyn NotificationStore, event: NotificationEvent) {
        match store.insert_notification(&event).await {
            Ok(()) => debug!(
                "Saved notification for user {}",
                event.recipient_user_id
            ),
            Err(e) => error!(
                "Failed to save notification for user {}: {e}",
                event.recipient_user_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel;
    use crate::error::{Error, ErrorKind};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::{Notify, Semaphore};
    use tokio::time::timeout;

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingStore {
        fn saved(&self) -> Vec<String> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationStore for RecordingStore {
        async fn insert_notification(&self, event: &NotificationEvent) -> Result<(), Error> {
            if self.fail_on.as_deref() == Some(event.message.as_str()) {
                return Err(ErrorKind::Persistence.into());
            }
            self.saved.lock().unwrap().push(event.message.clone());
            Ok(())
        }
    }

    /// Blocks inside every insert until a permit is released.
    struct GatedStore {
        started: Notify,
        gate: Semaphore,
        saved: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationStore for GatedStore {
        async fn insert_notification(&self, event: &NotificationEvent) -> Result<(), Error> {
            self.started.notify_one();
            let _permit = self.gate.acquire().await.unwrap();
            self.saved.lock().unwrap().push(event.message.clone());
            Ok(())
        }
    }

    async fn wait_for_saved(store: &RecordingStore, count: usize) {
        timeout(Duration::from_secs(5), async {
            while store.saved().len() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("worker did not persist in time");
    }

    #[tokio::test]
    async fn persists_in_arrival_order() {
        let (queue, worker) = channel(16);
        let store = Arc::new(RecordingStore::default());
        let shutdown = CancellationToken::new();

        assert!(queue.enqueue(1, "A"));
        assert!(queue.enqueue(2, "B"));
        assert!(queue.enqueue(3, "C"));

        let handle = worker.spawn(store.clone(), shutdown.clone());
        wait_for_saved(&store, 3).await;

        assert_eq!(store.saved(), vec!["A", "B", "C"]);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn failed_persist_is_skipped_and_worker_continues() {
        let (queue, worker) = channel(16);
        let store = Arc::new(RecordingStore {
            fail_on: Some("B".to_owned()),
            ..Default::default()
        });
        let shutdown = CancellationToken::new();
        let handle = worker.spawn(store.clone(), shutdown.clone());

        for message in ["A", "B", "C"] {
            assert!(queue.enqueue(7, message));
        }
        wait_for_saved(&store, 2).await;

        assert_eq!(store.saved(), vec!["A", "C"]);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn idle_worker_stops_promptly_on_cancel() {
        let (_queue, worker) = channel(4);
        let store = Arc::new(RecordingStore::default());
        let shutdown = CancellationToken::new();
        let handle = worker.spawn(store, shutdown.clone());

        shutdown.cancel();

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("idle worker should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_mid_persist_finishes_current_item_and_abandons_rest() {
        let (queue, worker) = channel(4);
        let store = Arc::new(GatedStore {
            started: Notify::new(),
            gate: Semaphore::new(0),
            saved: Mutex::new(Vec::new()),
        });
        let shutdown = CancellationToken::new();

        assert!(queue.enqueue(1, "in flight"));
        assert!(queue.enqueue(1, "still buffered"));

        let handle = worker.spawn(store.clone(), shutdown.clone());
        store.started.notified().await;

        shutdown.cancel();
        store.gate.add_permits(1);

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop after finishing the current item")
            .unwrap();

        assert_eq!(*store.saved.lock().unwrap(), vec!["in flight"]);
        // The worker is gone, so the remaining item stays undelivered
        assert!(!queue.enqueue(1, "after shutdown"));
    }

    #[tokio::test]
    async fn worker_exits_when_all_queue_handles_are_dropped() {
        let (queue, worker) = channel(4);
        let store = Arc::new(RecordingStore::default());
        let handle = worker.spawn(store.clone(), CancellationToken::new());

        assert!(queue.enqueue(1, "last words"));
        drop(queue);

        timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should exit when the queue closes")
            .unwrap();
        assert_eq!(store.saved(), vec!["last words"]);
    }
}
