//! Long-lived relay from the progress stream to the active sink.
//!
//! The relay owns the single process-wide subscription. It is spawned once
//! and stays alive for the whole session; consumers come and go by
//! registering a [`ProgressSink`].

use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::channel::{ProgressEvent, ProgressSubscription};

/// Receiver of relayed progress events.
pub trait ProgressSink: Send + Sync {
    /// Handle one event. Called from the relay task; must not block.
    fn deliver(&self, event: &ProgressEvent);
}

type SinkSlot = Arc<RwLock<Option<Arc<dyn ProgressSink>>>>;

/// Forwards every event on a subscription to the registered sink.
pub struct ProgressRelay {
    sink: SinkSlot,
    handle: JoinHandle<()>,
}

impl ProgressRelay {
    /// Spawn the relay task on the current tokio runtime.
    pub fn spawn(mut subscription: ProgressSubscription) -> Self {
        let sink: SinkSlot = Arc::new(RwLock::new(None));

        let task_sink = Arc::clone(&sink);
        let handle = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                let current = task_sink
                    .read()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone();
                match current {
                    Some(sink) => sink.deliver(&event),
                    None => debug!(operation_id = %event.operation_id, "No progress sink registered"),
                }
            }
            info!("Progress stream closed, relay stopped");
        });

        Self { sink, handle }
    }

    /// Register the sink that receives subsequent events, replacing any other.
    pub fn register(&self, sink: Arc<dyn ProgressSink>) {
        *self
            .sink
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(sink);
    }

    /// Whether the relay task is still running.
    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ProgressRelay {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ProgressChannel;
    use ripley_models::OperationId;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        values: Mutex<Vec<f64>>,
    }

    impl ProgressSink for RecordingSink {
        fn deliver(&self, event: &ProgressEvent) {
            self.values.lock().unwrap().push(event.value);
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_relay_forwards_to_registered_sink() {
        let channel = ProgressChannel::default();
        let relay = ProgressRelay::spawn(channel.subscribe());
        let sink = Arc::new(RecordingSink::default());
        relay.register(sink.clone());

        let id = OperationId::new();
        channel.publisher().progress(&id, 10.0);
        channel.publisher().progress(&id, 20.0);
        settle().await;

        assert_eq!(*sink.values.lock().unwrap(), vec![10.0, 20.0]);
    }

    #[tokio::test]
    async fn test_register_replaces_previous_sink() {
        let channel = ProgressChannel::default();
        let relay = ProgressRelay::spawn(channel.subscribe());
        let first = Arc::new(RecordingSink::default());
        let second = Arc::new(RecordingSink::default());
        relay.register(first.clone());
        relay.register(second.clone());

        channel.publisher().progress(&OperationId::new(), 30.0);
        settle().await;

        assert!(first.values.lock().unwrap().is_empty());
        assert_eq!(*second.values.lock().unwrap(), vec![30.0]);
    }

    #[tokio::test]
    async fn test_events_without_sink_are_dropped() {
        let channel = ProgressChannel::default();
        let relay = ProgressRelay::spawn(channel.subscribe());

        channel.publisher().progress(&OperationId::new(), 40.0);
        settle().await;

        let sink = Arc::new(RecordingSink::default());
        relay.register(sink.clone());
        settle().await;

        assert!(sink.values.lock().unwrap().is_empty());
        assert!(relay.is_alive());
    }

    #[tokio::test]
    async fn test_relay_stops_when_stream_closes() {
        let channel = ProgressChannel::default();
        let relay = ProgressRelay::spawn(channel.subscribe());
        drop(channel);
        settle().await;

        assert!(!relay.is_alive());
    }
}
