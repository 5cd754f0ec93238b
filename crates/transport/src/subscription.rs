//! TopicSubscription - inbound capability backed by an in-process topic

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::{ContractError, MessageCallback, Subscriber};
use tracing::debug;

use crate::executor::{DispatchEntry, Executor};
use crate::stats::TopicStats;
use crate::topic::QueueSlot;

/// Subscription bound to one topic
///
/// The queue exists from creation, so messages published before a callback
/// is registered are kept (up to the queue depth).
pub struct TopicSubscription<T> {
    topic: String,
    slot: Arc<QueueSlot<T>>,
    stats: Arc<TopicStats>,
    executor: Arc<Executor>,
    subscribed: AtomicBool,
}

impl<T: Send + 'static> TopicSubscription<T> {
    pub(crate) fn new(
        topic: String,
        slot: Arc<QueueSlot<T>>,
        stats: Arc<TopicStats>,
        executor: Arc<Executor>,
    ) -> Self {
        Self {
            topic,
            slot,
            stats,
            executor,
            subscribed: AtomicBool::new(false),
        }
    }

    /// Resolved topic name
    pub fn topic_name(&self) -> &str {
        &self.topic
    }

    /// Messages waiting for dispatch
    pub fn pending(&self) -> usize {
        self.slot.len()
    }
}

impl<T: Send + 'static> Subscriber<T> for TopicSubscription<T> {
    fn subscribe(&self, callback: MessageCallback<T>) -> Result<(), ContractError> {
        if self.executor.is_shutdown() {
            return Err(ContractError::ContextShutdown);
        }
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(ContractError::AlreadySubscribed {
                topic: self.topic.clone(),
            });
        }

        debug!(topic = %self.topic, "callback registered");
        self.executor.register(Arc::new(Dispatch {
            topic: self.topic.clone(),
            slot: Arc::clone(&self.slot),
            stats: Arc::clone(&self.stats),
            callback,
        }));
        Ok(())
    }
}

impl<T> Drop for TopicSubscription<T> {
    fn drop(&mut self) {
        // Without a callback nobody will ever drain the queue
        if !self.subscribed.load(Ordering::SeqCst) {
            self.slot.close();
        }
    }
}

/// Queue plus callback, as seen by the executor
struct Dispatch<T> {
    topic: String,
    slot: Arc<QueueSlot<T>>,
    stats: Arc<TopicStats>,
    callback: MessageCallback<T>,
}

impl<T: Send + 'static> DispatchEntry for Dispatch<T> {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn dispatch_one(&self) -> bool {
        let Some(message) = self.slot.pop() else {
            return false;
        };
        self.stats.record_delivered();
        observability::record_message_delivered(&self.topic);
        (self.callback)(message);
        true
    }
}
