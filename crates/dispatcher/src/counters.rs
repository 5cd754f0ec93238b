//! Per-sink reading counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use contracts::{RangeReading, Time};

/// What happened to the readings handed to one sink
#[derive(Debug, Default)]
pub struct SinkCounters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
    out_of_envelope: AtomicU64,
    last_stamp: Mutex<Option<Time>>,
}

impl SinkCounters {
    pub(crate) fn on_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_written(&self, reading: &RangeReading) {
        self.written.fetch_add(1, Ordering::Relaxed);
        if !reading.is_within_limits() {
            self.out_of_envelope.fetch_add(1, Ordering::Relaxed);
        }
        *self
            .last_stamp
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reading.header.stamp);
    }

    pub(crate) fn on_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters; `backlog` is the sink's current queue length
    pub fn report(&self, backlog: usize) -> SinkReport {
        SinkReport {
            backlog,
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            out_of_envelope: self.out_of_envelope.load(Ordering::Relaxed),
            last_stamp: *self
                .last_stamp
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Point-in-time view of a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Readings waiting in the sink queue
    pub backlog: usize,
    /// Readings queued for the sink
    pub accepted: u64,
    /// Readings refused because the queue was full or closed
    pub rejected: u64,
    /// Readings the sink wrote
    pub written: u64,
    /// Readings the sink failed to write
    pub failed: u64,
    /// Written readings outside `[min_range, max_range]`
    pub out_of_envelope: u64,
    /// Stamp of the last written reading
    pub last_stamp: Option<Time>,
}

impl SinkReport {
    /// Accepted readings not yet written or failed
    pub fn in_flight(&self) -> u64 {
        self.accepted
            .saturating_sub(self.written)
            .saturating_sub(self.failed)
    }
}
