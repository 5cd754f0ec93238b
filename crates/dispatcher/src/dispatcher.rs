//! Dispatcher - fan-out of range readings to sinks

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, instrument};

use contracts::{ContractError, RangeReading, SinkConfig, SinkType, Subscriber};
use observability::{RangeStatsAggregator, RangeSummary};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::counters::SinkReport;
use crate::sinks::{FileSink, LogSink, NetworkSink};

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(config, e))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(config, e))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// State shared with the subscription callback
struct Shared {
    handles: Vec<SinkHandle>,
    stats: Mutex<RangeStatsAggregator>,
}

impl Shared {
    fn dispatch(&self, reading: RangeReading) {
        let in_envelope = reading.is_within_limits();
        observability::record_range_reading(reading.range, in_envelope);
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(&reading);

        for handle in &self.handles {
            handle.try_send(reading.clone());
        }
    }
}

/// Fans every reading out to all sinks
///
/// Each sink has its own queue and worker, so a slow or failing sink
/// never blocks the subscription callback or the other sinks.
pub struct Dispatcher {
    shared: Arc<Shared>,
}

impl Dispatcher {
    /// Build sinks from configuration
    ///
    /// Must be called inside a Tokio runtime.
    #[instrument(name = "dispatcher_from_configs", skip(configs), fields(sink_count = configs.len()))]
    pub async fn from_configs(configs: &[SinkConfig]) -> Result<Self, DispatcherError> {
        let mut seen = HashSet::new();
        let mut handles: Vec<SinkHandle> = Vec::with_capacity(configs.len());

        for config in configs {
            if !seen.insert(config.name.as_str()) {
                for handle in &handles {
                    handle.shutdown().await;
                }
                return Err(DispatcherError::DuplicateSink {
                    name: config.name.clone(),
                });
            }

            match create_sink_handle(config).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    for handle in &handles {
                        handle.shutdown().await;
                    }
                    return Err(e);
                }
            }
        }

        Ok(Self::with_handles(handles))
    }

    /// Create a dispatcher with custom sink handles
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            shared: Arc::new(Shared {
                handles,
                stats: Mutex::new(RangeStatsAggregator::new()),
            }),
        }
    }

    /// Number of sinks
    pub fn sink_count(&self) -> usize {
        self.shared.handles.len()
    }

    /// Register the fan-out callback on `subscriber`
    #[instrument(name = "dispatcher_attach", skip_all)]
    pub fn attach(&self, subscriber: &dyn Subscriber<RangeReading>) -> Result<(), ContractError> {
        let shared = Arc::clone(&self.shared);
        subscriber.subscribe(Arc::new(move |reading| shared.dispatch(reading)))?;
        info!(sinks = self.shared.handles.len(), "Dispatcher attached");
        Ok(())
    }

    /// Hand one reading to every sink
    pub fn dispatch(&self, reading: RangeReading) {
        self.shared.dispatch(reading);
    }

    /// Per-sink reports, in configuration order
    pub fn reports(&self) -> Vec<(String, SinkReport)> {
        self.shared
            .handles
            .iter()
            .map(|h| (h.name().to_string(), h.report()))
            .collect()
    }

    /// Statistics over every reading dispatched so far
    pub fn range_summary(&self) -> RangeSummary {
        self.shared
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    /// Drain queues, then flush and close every sink
    ///
    /// Readings dispatched afterwards are dropped.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(&self) {
        for handle in &self.shared.handles {
            handle.shutdown().await;
        }
        info!("Dispatcher shutdown complete");
    }
}
