//! Single-threaded dispatch loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, warn};

/// A subscription the executor can drain
pub(crate) trait DispatchEntry: Send + Sync {
    /// Topic name (used for logging)
    fn topic(&self) -> &str;

    /// Deliver at most one pending message; false if the queue was empty
    fn dispatch_one(&self) -> bool;
}

/// Owns the registered subscriptions and the wake-up signal
#[derive(Default)]
pub(crate) struct Executor {
    entries: Mutex<Vec<Arc<dyn DispatchEntry>>>,
    wake: Notify,
    spinning: AtomicBool,
    shutdown: AtomicBool,
}

impl Executor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, entry: Arc<dyn DispatchEntry>) {
        debug!(topic = %entry.topic(), "subscription registered with executor");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        self.notify();
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Signal that work may be pending
    pub(crate) fn notify(&self) {
        self.wake.notify_one();
    }

    /// Wait for the next `notify`
    pub(crate) async fn notified(&self) {
        self.wake.notified().await;
    }

    pub(crate) fn request_shutdown(&self) -> bool {
        let first = !self.shutdown.swap(true, Ordering::SeqCst);
        self.wake.notify_waiters();
        self.wake.notify_one();
        first
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Dispatch until every queue is empty
    ///
    /// Round-robin, one message per subscription per pass, so a chain of
    /// topics drains in step. Callbacks run to completion on the calling
    /// thread. A nested or concurrent call returns 0 without dispatching.
    pub(crate) fn spin_some(&self) -> usize {
        if self.spinning.swap(true, Ordering::Acquire) {
            warn!("executor is already spinning");
            return 0;
        }
        // Released on unwind as well
        let _spinning = SpinGuard(&self.spinning);

        let entries: Vec<Arc<dyn DispatchEntry>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut total = 0;
        while !self.is_shutdown() {
            let handled = entries.iter().filter(|entry| entry.dispatch_one()).count();
            if handled == 0 {
                break;
            }
            total += handled;
        }

        total
    }
}

struct SpinGuard<'a>(&'a AtomicBool);

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
