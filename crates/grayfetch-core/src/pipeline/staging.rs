//! Staging channel: hands downloaded files to the conversion workers.
//!
//! Unbounded so downloaders never wait on slow conversions. Multiple
//! producers (one per download task) and multiple consumers (the worker
//! pool) share it; each item is received by exactly one worker.
//!
//! The channel closes when the last [`StagingSender`] is dropped. Producers
//! never close it themselves: the dispatcher's clones go away as its tasks
//! finish, and the final sender is owned by the
//! [`ShutdownCoordinator`](super::shutdown::ShutdownCoordinator).

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::types::LocalImage;

/// Create a connected sender/receiver pair.
pub fn staging_channel() -> (StagingSender, StagingReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        StagingSender { tx },
        StagingReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer half. Cheap to clone; one clone per download task.
#[derive(Debug, Clone)]
pub struct StagingSender {
    tx: mpsc::UnboundedSender<LocalImage>,
}

impl StagingSender {
    /// Queue a downloaded image. Never blocks.
    ///
    /// Returns the image back if every receiver is gone.
    pub fn send(&self, image: LocalImage) -> Result<(), LocalImage> {
        self.tx.send(image).map_err(|e| e.0)
    }
}

/// Consumer half, shared by all workers.
///
/// Workers take turns on the inner receiver; whoever holds the lock gets the
/// next item, so no item is delivered twice.
#[derive(Debug, Clone)]
pub struct StagingReceiver {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<LocalImage>>>,
}

impl StagingReceiver {
    /// Wait for the next image.
    ///
    /// Returns `None` only once the channel is closed and fully drained.
    pub async fn recv(&self) -> Option<LocalImage> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Link;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn image(id: usize) -> LocalImage {
        LocalImage {
            id,
            link: Link::new(format!("http://example.com/{id}.jpg")),
            path: PathBuf::from(format!("inputs/image{id}.jpg")),
        }
    }

    #[tokio::test]
    async fn test_send_then_recv() {
        let (tx, rx) = staging_channel();
        tx.send(image(7)).unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, 7);
    }

    #[tokio::test]
    async fn test_buffered_items_drain_after_close() {
        let (tx, rx) = staging_channel();
        tx.send(image(1)).unwrap();
        tx.send(image(2)).unwrap();
        drop(tx);

        assert_eq!(rx.recv().await.map(|i| i.id), Some(1));
        assert_eq!(rx.recv().await.map(|i| i.id), Some(2));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_open_while_any_sender_alive() {
        let (tx, rx) = staging_channel();
        let tx2 = tx.clone();
        drop(tx);

        let pending = tokio::time::timeout(std::time::Duration::from_millis(50), rx.recv()).await;
        assert!(pending.is_err(), "recv should wait while a sender is alive");

        drop(tx2);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_each_item_received_once_across_consumers() {
        let (tx, rx) = staging_channel();
        for id in 0..100 {
            tx.send(image(id)).unwrap();
        }
        drop(tx);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let rx = rx.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                while let Some(img) = rx.recv().await {
                    ids.push(img.id);
                }
                ids
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(seen.insert(id), "item {id} delivered twice");
            }
        }
        assert_eq!(seen.len(), 100);
    }

    #[tokio::test]
    async fn test_send_after_receivers_dropped_returns_item() {
        let (tx, rx) = staging_channel();
        drop(rx);
        let returned = tx.send(image(3)).unwrap_err();
        assert_eq!(returned.id, 3);
    }
}
