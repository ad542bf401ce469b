//! Non-blocking telemetry buffer.
//!
//! Events are queued on a bounded channel and forwarded to the wrapped sink
//! by a background task, so slow sinks never hold up a request. When the
//! queue is full the event is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use switchboard_application::{TelemetryEvent, TelemetrySink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct BufferedTelemetrySink {
    sender: mpsc::Sender<TelemetryEvent>,
    dropped: AtomicU64,
}

impl BufferedTelemetrySink {
    /// Spawn the drain task on the current runtime.
    ///
    /// The task ends once the sink is dropped and the queue is drained.
    pub fn spawn(inner: Arc<dyn TelemetrySink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<TelemetryEvent>(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                inner.record(event);
            }
        });
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            handle,
        )
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TelemetrySink for BufferedTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        if let Err(e) = self.sender.try_send(event) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Telemetry event dropped: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        names: Mutex<Vec<&'static str>>,
    }

    impl TelemetrySink for Collect {
        fn record(&self, event: TelemetryEvent) {
            self.names.lock().unwrap().push(event.name);
        }
    }

    #[tokio::test]
    async fn test_forwards_in_order_and_drains_on_drop() {
        let inner = Arc::new(Collect::default());
        let (sink, handle) = BufferedTelemetrySink::spawn(inner.clone(), 16);

        sink.record(TelemetryEvent::new("routing_decision", json!({})));
        sink.record(TelemetryEvent::new("agent_error", json!({})));
        drop(sink);
        handle.await.unwrap();

        assert_eq!(
            *inner.names.lock().unwrap(),
            vec!["routing_decision", "agent_error"]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_instead_of_blocking() {
        let inner = Arc::new(Collect::default());
        let (sink, handle) = BufferedTelemetrySink::spawn(inner.clone(), 1);

        // The drain task cannot run until this task yields
        for _ in 0..3 {
            sink.record(TelemetryEvent::new("agent_error", json!({})));
        }
        assert_eq!(sink.dropped(), 2);

        drop(sink);
        handle.await.unwrap();
        assert_eq!(inner.names.lock().unwrap().len(), 1);
    }
}
