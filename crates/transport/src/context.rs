//! Process-scoped runtime context and nodes

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{resolve_topic_name, ContractError, QosProfile};
use tracing::{debug, info, instrument};

use crate::executor::Executor;
use crate::publisher::TopicPublisher;
use crate::stats::{TopicStats, TopicStatsSnapshot};
use crate::subscription::TopicSubscription;
use crate::topic::Topic;

/// Registered topic, type-erased
struct TopicEntry {
    type_name: &'static str,
    topic: Arc<dyn Any + Send + Sync>,
    stats: Arc<TopicStats>,
}

struct ContextInner {
    executor: Arc<Executor>,
    topics: Mutex<HashMap<String, TopicEntry>>,
}

/// Runtime context
///
/// Created once at process start with [`Context::init`], driven by
/// [`Context::run`] / [`Context::run_until`] (or [`Context::spin_some`] in
/// synchronous code), torn down once with [`Context::shutdown`].
/// Clones share the same runtime.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    /// Bring up the runtime
    #[instrument(name = "context_init")]
    pub fn init() -> Self {
        info!("transport context initialized");
        Self {
            inner: Arc::new(ContextInner {
                executor: Arc::new(Executor::new()),
                topics: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Create a node
    ///
    /// # Errors
    /// - Context already shut down
    /// - Name empty or not `[A-Za-z0-9_]`
    pub fn create_node(&self, name: &str) -> Result<Node, ContractError> {
        self.ensure_running()?;

        if name.is_empty()
            || name.starts_with(|c: char| c.is_ascii_digit())
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ContractError::config_validation(
                "node.name",
                format!("invalid node name '{name}'"),
            ));
        }

        debug!(node = %name, "node created");
        Ok(Node {
            name: name.to_string(),
            context: self.clone(),
        })
    }

    /// Dispatch everything that is pending, then return
    ///
    /// Returns the number of callbacks invoked.
    pub fn spin_some(&self) -> usize {
        self.inner.executor.spin_some()
    }

    /// Dispatch until [`shutdown`](Self::shutdown) is called
    pub async fn run(&self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Dispatch until `stop` completes or the context shuts down
    ///
    /// When `stop` completes, messages already queued are still delivered
    /// before returning. Returns `None` if shutdown came first.
    #[instrument(name = "context_run", skip_all)]
    pub async fn run_until<F: Future>(&self, stop: F) -> Option<F::Output> {
        let executor = &self.inner.executor;
        tokio::pin!(stop);

        info!(
            subscriptions = executor.entry_count(),
            "dispatch loop started"
        );

        loop {
            executor.spin_some();
            if executor.is_shutdown() {
                info!("dispatch loop stopped by shutdown");
                return None;
            }

            tokio::select! {
                biased;
                output = &mut stop => {
                    let drained = executor.spin_some();
                    info!(drained, "dispatch loop finished");
                    return Some(output);
                }
                _ = executor.notified() => {}
            }
        }
    }

    /// Tear down the runtime
    ///
    /// Idempotent. Wakes a running dispatch loop; afterwards publishes are
    /// dropped and node/subscription creation fails.
    pub fn shutdown(&self) {
        if self.inner.executor.request_shutdown() {
            info!("transport context shut down");
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shutdown(&self) -> bool {
        self.inner.executor.is_shutdown()
    }

    /// Counters for a resolved topic name
    pub fn topic_stats(&self, topic: &str) -> Option<TopicStatsSnapshot> {
        self.inner
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .map(|entry| entry.stats.snapshot())
    }

    /// Resolved names of all topics
    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn ensure_running(&self) -> Result<(), ContractError> {
        if self.is_shutdown() {
            Err(ContractError::ContextShutdown)
        } else {
            Ok(())
        }
    }

    /// Get or create a typed topic
    fn topic<T: Clone + Send + 'static>(
        &self,
        name: String,
    ) -> Result<Arc<Topic<T>>, ContractError> {
        let mut topics = self
            .inner
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = topics.get(&name) {
            return Arc::clone(&entry.topic)
                .downcast::<Topic<T>>()
                .map_err(|_| ContractError::TopicTypeMismatch {
                    topic: name.clone(),
                    existing: entry.type_name,
                    requested: type_name::<T>(),
                });
        }

        let stats = Arc::new(TopicStats::new());
        let topic = Arc::new(Topic::<T>::new(name.clone(), Arc::clone(&stats)));
        debug!(topic = %name, message_type = type_name::<T>(), "topic created");
        topics.insert(
            name,
            TopicEntry {
                type_name: type_name::<T>(),
                topic: topic.clone(),
                stats,
            },
        );
        Ok(topic)
    }
}

/// Named participant that owns publishers and subscriptions
pub struct Node {
    name: String,
    context: Context,
}

impl Node {
    /// Node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a publisher on `topic` (relative names resolve to `/topic`)
    pub fn create_publisher<T: Clone + Send + 'static>(
        &self,
        topic: &str,
    ) -> Result<TopicPublisher<T>, ContractError> {
        self.context.ensure_running()?;
        let resolved = resolve_topic_name(topic, &self.name)?;
        let topic = self.context.topic::<T>(resolved)?;

        debug!(node = %self.name, topic = %topic.name(), "publisher created");
        Ok(TopicPublisher::new(
            topic,
            Arc::clone(&self.context.inner.executor),
        ))
    }

    /// Create a subscription on `topic` with its own bounded queue
    pub fn create_subscription<T: Clone + Send + 'static>(
        &self,
        topic: &str,
        qos: QosProfile,
    ) -> Result<TopicSubscription<T>, ContractError> {
        self.context.ensure_running()?;
        if qos.depth == 0 {
            return Err(ContractError::config_validation(
                "qos.depth",
                "depth must be >= 1",
            ));
        }

        let resolved = resolve_topic_name(topic, &self.name)?;
        let topic = self.context.topic::<T>(resolved)?;
        let slot = topic.add_slot(qos);

        debug!(
            node = %self.name,
            topic = %topic.name(),
            depth = qos.depth,
            policy = qos.drop_policy.as_str(),
            "subscription created"
        );
        Ok(TopicSubscription::new(
            topic.name().to_string(),
            slot,
            Arc::clone(topic.stats()),
            Arc::clone(&self.context.inner.executor),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Publisher, Subscriber};
    use std::time::Duration;

    fn collect<T: Clone + Send + 'static>(
        subscription: &TopicSubscription<T>,
    ) -> Arc<Mutex<Vec<T>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        subscription
            .subscribe(Arc::new(move |message| sink.lock().unwrap().push(message)))
            .unwrap();
        seen
    }

    #[test]
    fn test_publish_and_spin() {
        let context = Context::init();
        let node = context.create_node("test_node").unwrap();
        let publisher = node.create_publisher::<u32>("numbers").unwrap();
        let subscription = node
            .create_subscription::<u32>("/numbers", QosProfile::keep_last(10))
            .unwrap();
        let seen = collect(&subscription);

        for i in 0..5 {
            publisher.send(i);
        }
        assert_eq!(context.spin_some(), 5);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);

        let stats = context.topic_stats("/numbers").unwrap();
        assert_eq!(stats.published, 5);
        assert_eq!(stats.delivered, 5);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_topic_names_resolved_and_sorted() {
        let context = Context::init();
        let node = context.create_node("fake_sensor").unwrap();
        node.create_publisher::<u32>("vl53l1x/range").unwrap();
        node.create_subscription::<u32>("/drone/odom", QosProfile::default()).unwrap();
        node.create_publisher::<u32>("~/debug").unwrap();

        assert_eq!(
            context.topic_names(),
            vec!["/drone/odom", "/fake_sensor/debug", "/vl53l1x/range"]
        );
    }

    #[test]
    fn test_type_mismatch() {
        let context = Context::init();
        let node = context.create_node("test_node").unwrap();
        node.create_publisher::<u32>("numbers").unwrap();

        let err = node.create_publisher::<String>("numbers").err().unwrap();
        assert!(matches!(err, ContractError::TopicTypeMismatch { .. }));
    }

    #[test]
    fn test_double_subscribe_rejected() {
        let context = Context::init();
        let node = context.create_node("test_node").unwrap();
        let subscription = node
            .create_subscription::<u32>("numbers", QosProfile::default())
            .unwrap();
        let _seen = collect(&subscription);

        let err = subscription.subscribe(Arc::new(|_| {})).err().unwrap();
        assert!(matches!(err, ContractError::AlreadySubscribed { .. }));
    }

    #[test]
    fn test_invalid_names() {
        let context = Context::init();
        assert!(context.create_node("").is_err());
        assert!(context.create_node("fake sensor").is_err());

        let node = context.create_node("fake_sensor").unwrap();
        assert!(node.create_publisher::<u32>("drone//odom").is_err());
        assert!(node
            .create_subscription::<u32>("drone/odom", QosProfile::keep_last(0))
            .is_err());
    }

    #[test]
    fn test_chain_drains_in_step() {
        let context = Context::init();
        let node = context.create_node("relay").unwrap();
        let downstream = node.create_publisher::<u32>("out").unwrap();
        let input = node
            .create_subscription::<u32>("in", QosProfile::keep_last(2))
            .unwrap();
        input
            .subscribe(Arc::new(move |n: u32| downstream.send(n * 10)))
            .unwrap();
        let output = node
            .create_subscription::<u32>("out", QosProfile::keep_last(2))
            .unwrap();
        let seen = collect(&output);

        let upstream = node.create_publisher::<u32>("in").unwrap();
        for i in 1..=2 {
            upstream.send(i);
        }
        context.spin_some();
        for i in 3..=4 {
            upstream.send(i);
        }
        context.spin_some();

        assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_shutdown_blocks_new_work() {
        let context = Context::init();
        let node = context.create_node("test_node").unwrap();
        let publisher = node.create_publisher::<u32>("numbers").unwrap();
        let subscription = node
            .create_subscription::<u32>("numbers", QosProfile::default())
            .unwrap();
        let seen = collect(&subscription);

        context.shutdown();
        context.shutdown();
        assert!(context.is_shutdown());

        publisher.send(1);
        assert_eq!(context.spin_some(), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert!(matches!(
            context.create_node("late"),
            Err(ContractError::ContextShutdown)
        ));
    }

    #[tokio::test]
    async fn test_run_until_drains_before_returning() {
        let context = Context::init();
        let node = context.create_node("test_node").unwrap();
        let publisher = node.create_publisher::<u32>("numbers").unwrap();
        let subscription = node
            .create_subscription::<u32>("numbers", QosProfile::keep_last(100))
            .unwrap();
        let seen = collect(&subscription);

        let producer = std::thread::spawn(move || {
            for i in 0..50 {
                publisher.send(i);
            }
        });
        let done = tokio::task::spawn_blocking(move || producer.join().is_ok());

        let output = context.run_until(done).await;
        assert!(matches!(output, Some(Ok(true))));
        assert_eq!(seen.lock().unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_run_returns_on_shutdown() {
        let context = Context::init();
        let handle = context.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.shutdown();
        });

        tokio::time::timeout(Duration::from_secs(2), context.run())
            .await
            .unwrap();
    }
}
