//! Per-topic counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Topic metrics
#[derive(Debug, Default)]
pub struct TopicStats {
    /// Messages handed to the topic by publishers
    pub published: AtomicU64,

    /// Messages handed to subscription callbacks
    pub delivered: AtomicU64,

    /// Messages lost to queue overflow
    pub dropped: AtomicU64,
}

impl TopicStats {
    /// Create new stats instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record message published
    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record message delivered
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record message dropped
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> TopicStatsSnapshot {
        TopicStatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Topic metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicStatsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
}
