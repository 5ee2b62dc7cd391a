//! Progress events over an in-process broadcast channel.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use ripley_models::OperationId;

/// Name of the process-wide progress stream.
pub const PROGRESS_STREAM: &str = "conversion-progress";

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Progress notification for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Operation that produced the notification
    pub operation_id: OperationId,
    /// Percentage, nominally 0-100
    pub value: f64,
    /// When the notification was emitted
    pub emitted_at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(operation_id: OperationId, value: f64) -> Self {
        Self {
            operation_id,
            value,
            emitted_at: Utc::now(),
        }
    }
}

/// Channel for publishing/subscribing to progress events.
#[derive(Debug, Clone)]
pub struct ProgressChannel {
    tx: broadcast::Sender<ProgressEvent>,
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ProgressChannel {
    /// Create the progress stream with the given per-subscriber capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Get the stream name.
    pub fn name(&self) -> &'static str {
        PROGRESS_STREAM
    }

    /// Cloneable handle for producers.
    pub fn publisher(&self) -> ProgressPublisher {
        ProgressPublisher { tx: self.tx.clone() }
    }

    /// Subscribe to every event published after this call.
    pub fn subscribe(&self) -> ProgressSubscription {
        ProgressSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Producer side of the progress stream.
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressPublisher {
    /// Publish a progress event. Events with no listener are dropped.
    pub fn publish(&self, event: ProgressEvent) {
        debug!(
            stream = PROGRESS_STREAM,
            operation_id = %event.operation_id,
            value = event.value,
            "Publishing progress event"
        );
        if self.tx.send(event).is_err() {
            debug!(stream = PROGRESS_STREAM, "No progress subscribers, event dropped");
        }
    }

    /// Publish a progress update.
    pub fn progress(&self, operation_id: &OperationId, value: f64) {
        self.publish(ProgressEvent::new(operation_id.clone(), value));
    }
}

/// Consumer side of the progress stream.
#[derive(Debug)]
pub struct ProgressSubscription {
    rx: broadcast::Receiver<ProgressEvent>,
}

impl ProgressSubscription {
    /// Wait for the next event. Returns `None` once every publisher is gone.
    ///
    /// A lagging subscriber skips the overwritten events; only the latest
    /// value matters to consumers.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(stream = PROGRESS_STREAM, skipped, "Progress subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let channel = ProgressChannel::default();
        let mut sub = channel.subscribe();
        let publisher = channel.publisher();
        let id = OperationId::new();

        publisher.progress(&id, 12.0);

        let event = sub.recv().await.unwrap();
        assert_eq!(event.operation_id, id);
        assert_eq!(event.value, 12.0);
        assert_eq!(channel.name(), PROGRESS_STREAM);
    }

    #[tokio::test]
    async fn test_events_keep_their_operation_id() {
        let channel = ProgressChannel::default();
        let mut sub = channel.subscribe();
        let publisher = channel.publisher();
        let stale = OperationId::new();
        let current = OperationId::new();

        publisher.progress(&stale, 90.0);
        publisher.progress(&current, 5.0);

        assert_eq!(sub.recv().await.unwrap().operation_id, stale);
        let event = sub.recv().await.unwrap();
        assert_eq!(event.operation_id, current);
        assert_eq!(event.value, 5.0);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_latest() {
        let channel = ProgressChannel::new(2);
        let mut sub = channel.subscribe();
        let publisher = channel.publisher();
        let id = OperationId::new();

        for value in [1.0, 2.0, 3.0, 4.0] {
            publisher.progress(&id, value);
        }

        let event = sub.recv().await.unwrap();
        assert_eq!(event.value, 3.0);
        assert_eq!(sub.recv().await.unwrap().value, 4.0);
    }

    #[tokio::test]
    async fn test_recv_ends_when_channel_dropped() {
        let channel = ProgressChannel::default();
        let mut sub = channel.subscribe();
        let publisher = channel.publisher();
        let id = OperationId::new();

        publisher.progress(&id, 50.0);
        drop(publisher);
        drop(channel);

        assert_eq!(sub.recv().await.map(|e| e.value), Some(50.0));
        assert!(sub.recv().await.is_none());
    }
}
