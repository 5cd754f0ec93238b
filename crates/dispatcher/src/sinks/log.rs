//! LogSink - logs reading summary via tracing

use contracts::{ContractError, RangeReading, RangeSink};
use tracing::{info, instrument};

/// Sink that logs each reading for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl RangeSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            frame_id = %reading.header.frame_id,
            stamp = reading.header.stamp.as_secs_f64(),
            range = reading.range,
            in_envelope = reading.is_within_limits(),
            "RangeReading"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
