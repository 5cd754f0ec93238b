//! RangeSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, RangeReading};

/// Range reading output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(RangeSink: Send)]
pub trait LocalRangeSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one reading
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, reading: &RangeReading) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
