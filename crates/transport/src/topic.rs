//! Typed topic and bounded subscription queues

use std::sync::{Arc, Mutex, PoisonError};

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{DropPolicy, QosProfile};
use tracing::{trace, warn};

use crate::stats::TopicStats;

/// A named channel carrying messages of one type
///
/// Publishing copies the message into every subscription queue.
pub(crate) struct Topic<T> {
    name: String,
    slots: Mutex<Vec<Arc<QueueSlot<T>>>>,
    stats: Arc<TopicStats>,
}

impl<T: Clone + Send + 'static> Topic<T> {
    pub(crate) fn new(name: String, stats: Arc<TopicStats>) -> Self {
        Self {
            name,
            slots: Mutex::new(Vec::new()),
            stats,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn stats(&self) -> &Arc<TopicStats> {
        &self.stats
    }

    /// Add a subscription queue
    pub(crate) fn add_slot(&self, qos: QosProfile) -> Arc<QueueSlot<T>> {
        let slot = Arc::new(QueueSlot::new(
            self.name.clone(),
            qos,
            Arc::clone(&self.stats),
        ));
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&slot));
        slot
    }

    /// Fan a message out to every subscription queue
    ///
    /// Returns the number of queues that accepted it.
    pub(crate) fn publish(&self, message: T) -> usize {
        self.stats.record_published();
        observability::record_message_published(&self.name);

        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.is_empty() {
            trace!(topic = %self.name, "no subscribers, message discarded");
            return 0;
        }

        slots
            .iter()
            .filter(|slot| slot.offer(message.clone()))
            .count()
    }
}

/// Bounded queue owned by one subscription
pub(crate) struct QueueSlot<T> {
    topic: String,
    qos: QosProfile,
    tx: Sender<T>,
    rx: Receiver<T>,
    stats: Arc<TopicStats>,
}

impl<T> QueueSlot<T> {
    fn new(topic: String, qos: QosProfile, stats: Arc<TopicStats>) -> Self {
        let (tx, rx) = bounded(qos.depth.max(1));
        Self {
            topic,
            qos,
            tx,
            rx,
            stats,
        }
    }

    /// Enqueue, applying the drop policy when full
    pub(crate) fn offer(&self, message: T) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                self.record_drop();
                match self.qos.drop_policy {
                    DropPolicy::DropNewest => false,
                    DropPolicy::DropOldest => {
                        // Evict the head, then retry once
                        let _ = self.rx.try_recv();
                        self.tx.try_send(message).is_ok()
                    }
                }
            }
            Err(TrySendError::Closed(_)) => {
                warn!(topic = %self.topic, "subscription queue closed");
                false
            }
        }
    }

    /// Take the oldest pending message
    pub(crate) fn pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Pending message count
    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    /// Close the queue; later offers are rejected
    pub(crate) fn close(&self) {
        self.tx.close();
    }

    fn record_drop(&self) {
        self.stats.record_dropped();
        observability::record_message_dropped(&self.topic, self.qos.drop_policy.as_str());
        warn!(
            topic = %self.topic,
            depth = self.qos.depth,
            policy = self.qos.drop_policy.as_str(),
            "Queue full, message dropped"
        );
    }
}
