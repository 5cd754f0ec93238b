//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::{Arc, Mutex, PoisonError};

use async_channel::{bounded, Receiver, Sender, TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{RangeReading, RangeSink};

use crate::counters::{SinkCounters, SinkReport};

/// Handle to a running sink worker
///
/// `try_send` never blocks the caller: a full queue drops the incoming
/// reading and a failing sink only bumps its own counters.
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send readings to worker
    tx: Sender<RangeReading>,
    /// Counters shared with the worker
    counters: Arc<SinkCounters>,
    /// Worker task handle, taken on shutdown
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn<S: RangeSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = bounded(queue_capacity.max(1));
        let counters = Arc::new(SinkCounters::default());

        let worker_counters = Arc::clone(&counters);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_counters, worker_name).await;
        });

        Self {
            name,
            tx,
            counters,
            worker_handle: Mutex::new(Some(worker_handle)),
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Counters plus the live queue length
    pub fn report(&self) -> SinkReport {
        self.counters.report(self.tx.len())
    }

    /// Send a reading to the sink (non-blocking)
    ///
    /// Returns true if queued, false if dropped
    pub fn try_send(&self, reading: RangeReading) -> bool {
        match self.tx.try_send(reading) {
            Ok(()) => {
                self.counters.on_accepted();
                true
            }
            Err(TrySendError::Full(reading)) => {
                self.counters.on_rejected();
                warn!(sink = %self.name, range = reading.range, "Queue full, reading dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.on_rejected();
                error!(sink = %self.name, "Sink worker closed");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully
    ///
    /// Queued readings are written before the sink is flushed and closed.
    /// Later calls return immediately.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(&self) {
        self.tx.close();

        let worker = self
            .worker_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(sink = %self.name, error = ?e, "Worker task panicked");
            }
            debug!(sink = %self.name, "SinkHandle shutdown complete");
        }
    }
}

/// Worker task that consumes readings and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, counters),
    fields(sink = %name)
)]
async fn sink_worker<S: RangeSink>(
    mut sink: S,
    rx: Receiver<RangeReading>,
    counters: Arc<SinkCounters>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Ok(reading) = rx.recv().await {
        match sink.write(&reading).await {
            Ok(()) => {
                counters.on_written(&reading);
                observability::record_sink_write(&name, true);
            }
            Err(e) => {
                counters.on_failed();
                observability::record_sink_write(&name, false);
                error!(sink = %name, error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, Header, RadiationType};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    /// Mock sink for testing
    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        closed: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                write_count: Arc::new(AtomicU64::new(0)),
                closed: Arc::new(AtomicU64::new(0)),
                should_fail: false,
                delay_ms: 0,
            }
        }
    }

    impl RangeSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _reading: &RangeReading) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            self.closed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn reading(range: f32) -> RangeReading {
        RangeReading {
            header: Header::default(),
            radiation_type: RadiationType::Infrared,
            field_of_view: 0.47,
            min_range: 0.14,
            max_range: 3.0,
            range,
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let sink = MockSink::new("test");
        let write_count = Arc::clone(&sink.write_count);
        let closed = Arc::clone(&sink.closed);

        let handle = SinkHandle::spawn(sink, 10);
        for i in 0..5 {
            assert!(handle.try_send(reading(i as f32)));
        }

        handle.shutdown().await;
        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
        assert_eq!(closed.load(Ordering::Relaxed), 1);
        let report = handle.report();
        assert_eq!(report.accepted, 5);
        assert_eq!(report.written, 5);
        assert_eq!(report.backlog, 0);
        assert_eq!(report.last_stamp, Some(Header::default().stamp));
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let mut sink = MockSink::new("slow");
        sink.delay_ms = 100;

        let handle = SinkHandle::spawn(sink, 2);
        for i in 0..10 {
            handle.try_send(reading(i as f32));
        }

        let report = handle.report();
        assert!(report.rejected > 0);
        assert_eq!(report.accepted + report.rejected, 10);
        assert!(report.backlog <= 2);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let mut sink = MockSink::new("failing");
        sink.should_fail = true;

        let handle = SinkHandle::spawn(sink, 10);
        for i in 0..3 {
            handle.try_send(reading(i as f32));
        }

        handle.shutdown().await;
        let report = handle.report();
        assert_eq!(report.failed, 3);
        assert_eq!(report.written, 0);
        assert_eq!(report.last_stamp, None);
    }

    #[tokio::test]
    async fn test_send_after_shutdown_rejected() {
        let handle = SinkHandle::spawn(MockSink::new("late"), 4);
        handle.shutdown().await;
        assert!(!handle.try_send(reading(1.0)));
        assert_eq!(handle.report().rejected, 1);
    }
}
