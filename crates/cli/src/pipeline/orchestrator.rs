//! Pipeline orchestrator - wires the sensor into the transport.
//!
//! pose source -> pose topic -> RangeSynthesizer -> range topic -> Dispatcher -> sinks

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use contracts::{BridgeBlueprint, PoseSample, PoseSource, RangeReading, Subscriber};
use dispatcher::Dispatcher;
use range_sensor::{RangeSynthesizer, SystemClock};
use tokio::sync::Notify;
use tracing::{debug, info, warn};
use transport::{source_from_config, Context};

use super::{PipelineStats, StopReason};
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated wiring
    pub blueprint: BridgeBlueprint,

    /// Stop after this many range readings (None = unlimited)
    pub max_readings: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the source finishes, a limit is hit, or `shutdown` resolves
    pub async fn run<S>(self, shutdown: S) -> Result<PipelineStats>
    where
        S: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Runtime + node
        let context = Context::init();
        let node = context
            .create_node(&blueprint.node.name)
            .map_err(CliError::from)?;

        // Outbound side: range topic -> dispatcher
        let range_publisher = node
            .create_publisher::<RangeReading>(&blueprint.topics.range)
            .map_err(CliError::from)?;
        let range_subscription = node
            .create_subscription::<RangeReading>(&blueprint.topics.range, blueprint.qos)
            .map_err(CliError::from)?;

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - readings are only counted");
        }
        let dispatcher = Dispatcher::from_configs(&blueprint.sinks)
            .await
            .context("Failed to create dispatcher")?;
        dispatcher
            .attach(&range_subscription)
            .map_err(CliError::from)?;

        // Reading counter for --max-readings
        let readings = Arc::new(AtomicU64::new(0));
        let limit_reached = Arc::new(Notify::new());
        if let Some(max) = self.config.max_readings {
            let counter_subscription = node
                .create_subscription::<RangeReading>(&blueprint.topics.range, blueprint.qos)
                .map_err(CliError::from)?;
            let readings = Arc::clone(&readings);
            let limit_reached = Arc::clone(&limit_reached);
            counter_subscription
                .subscribe(Arc::new(move |_| {
                    if readings.fetch_add(1, Ordering::Relaxed) + 1 == max {
                        limit_reached.notify_one();
                    }
                }))
                .map_err(CliError::from)?;
        }

        // Inbound side: pose topic -> synthesizer -> range topic
        let pose_subscription = node
            .create_subscription::<PoseSample>(&blueprint.topics.pose, blueprint.qos)
            .map_err(CliError::from)?;
        RangeSynthesizer::new(Arc::new(range_publisher), Arc::new(SystemClock))
            .attach(&pose_subscription)
            .map_err(CliError::from)?;

        info!(
            node = %node.name(),
            pose_topic = %pose_subscription.topic_name(),
            range_topic = %range_subscription.topic_name(),
            depth = blueprint.qos.depth,
            sinks = dispatcher.sink_count(),
            "Sensor wired"
        );
        debug!(topics = ?context.topic_names(), "Registered topics");

        // Pose source
        let source: Arc<dyn PoseSource> = Arc::from(
            source_from_config(&blueprint.source)
                .map_err(|e| CliError::pipeline_setup(e.to_string()))?,
        );
        let pose_publisher = node
            .create_publisher::<PoseSample>(&blueprint.topics.pose)
            .map_err(CliError::from)?;
        source.start(Arc::new(pose_publisher));
        info!(source = %source.name(), "Pose source started");

        let waiter = Arc::clone(&source);
        let mut source_done = tokio::task::spawn_blocking(move || waiter.wait());
        let mut samples_emitted = None;

        let timeout = self.config.timeout;
        let stop = async {
            tokio::select! {
                joined = &mut source_done => {
                    samples_emitted = Some(joined.unwrap_or(0));
                    StopReason::SourceFinished
                }
                _ = limit_reached.notified() => StopReason::MaxReadings,
                _ = sleep_or_pending(timeout) => StopReason::Timeout,
                _ = shutdown => StopReason::Signal,
            }
        };

        let stop_reason = context
            .run_until(stop)
            .await
            .unwrap_or(StopReason::Shutdown);
        info!(reason = %stop_reason, "Stopping sensor");

        // Teardown: stop the source, deliver what is still queued, then close sinks
        source.stop();
        let samples_emitted = match samples_emitted {
            Some(emitted) => emitted,
            None => source_done.await.unwrap_or(0),
        };
        let drained = context.spin_some();
        debug!(drained, "Drained pending messages");

        let pose_topic = context
            .topic_stats(pose_subscription.topic_name())
            .unwrap_or_default();
        let range_topic = context
            .topic_stats(range_subscription.topic_name())
            .unwrap_or_default();

        context.shutdown();
        dispatcher.shutdown().await;

        let stats = PipelineStats {
            stop_reason,
            duration: start_time.elapsed(),
            samples_emitted,
            pose_topic,
            range_topic,
            sinks: dispatcher.reports(),
            ranges: dispatcher.range_summary(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            readings = stats.range_topic.published,
            rate_hz = format!("{:.2}", stats.rate_hz()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

async fn sleep_or_pending(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}
