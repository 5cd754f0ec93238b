//! TopicPublisher - outbound capability backed by an in-process topic

use std::sync::Arc;

use contracts::Publisher;
use tracing::warn;

use crate::executor::Executor;
use crate::topic::Topic;

/// Publisher bound to one topic
///
/// Cheap to clone; clones share the topic.
pub struct TopicPublisher<T> {
    topic: Arc<Topic<T>>,
    executor: Arc<Executor>,
}

impl<T> Clone for TopicPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            topic: Arc::clone(&self.topic),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<T: Clone + Send + 'static> TopicPublisher<T> {
    pub(crate) fn new(topic: Arc<Topic<T>>, executor: Arc<Executor>) -> Self {
        Self { topic, executor }
    }

    /// Resolved topic name
    pub fn topic_name(&self) -> &str {
        self.topic.name()
    }
}

impl<T: Clone + Send + 'static> Publisher<T> for TopicPublisher<T> {
    fn send(&self, message: T) {
        if self.executor.is_shutdown() {
            warn!(topic = %self.topic.name(), "context shut down, message dropped");
            return;
        }

        if self.topic.publish(message) > 0 {
            self.executor.notify();
        }
    }
}
