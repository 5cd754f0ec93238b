//! Pipeline statistics.

use std::fmt;
use std::time::Duration;

use dispatcher::SinkReport;
use observability::RangeSummary;
use transport::TopicStatsSnapshot;

/// Why the run ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// The pose source emitted everything it had
    #[default]
    SourceFinished,
    /// `--max-readings` reached
    MaxReadings,
    /// `--timeout` elapsed
    Timeout,
    /// Ctrl+C or SIGTERM
    Signal,
    /// Context was shut down elsewhere
    Shutdown,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::SourceFinished => "source finished",
            StopReason::MaxReadings => "max readings reached",
            StopReason::Timeout => "timeout",
            StopReason::Signal => "signal",
            StopReason::Shutdown => "context shut down",
        };
        f.write_str(text)
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Why the run ended
    pub stop_reason: StopReason,

    /// Total duration of the run
    pub duration: Duration,

    /// Pose samples emitted by the source
    pub samples_emitted: u64,

    /// Pose topic counters
    pub pose_topic: TopicStatsSnapshot,

    /// Range topic counters
    pub range_topic: TopicStatsSnapshot,

    /// Per-sink counters
    pub sinks: Vec<(String, SinkReport)>,

    /// Statistics over emitted ranges
    pub ranges: RangeSummary,
}

impl PipelineStats {
    /// Readings per second
    pub fn rate_hz(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.range_topic.published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                  Fake Range Sensor Statistics                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Stopped by: {}", self.stop_reason);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Pose samples emitted: {}", self.samples_emitted);
        println!("   └─ Rate: {:.2} Hz", self.rate_hz());

        println!("\n📡 Topics");
        print_topic("pose", &self.pose_topic, false);
        print_topic("range", &self.range_topic, true);

        println!("\n📏 Ranges");
        println!("   ├─ Readings: {}", self.ranges.total_readings);
        println!(
            "   ├─ Outside envelope: {} below / {} above ({:.2}%)",
            self.ranges.below_min, self.ranges.above_max, self.ranges.outside_rate
        );
        println!("   └─ Range (m): {}", self.ranges.range_m);

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, report)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} written ({} out of envelope), {} failed, {} dropped",
                    prefix,
                    name,
                    report.written,
                    report.out_of_envelope,
                    report.failed,
                    report.rejected
                );
            }
        }

        println!();
    }
}

fn print_topic(label: &str, stats: &TopicStatsSnapshot, last: bool) {
    let prefix = if last { "└─" } else { "├─" };
    println!(
        "   {} {}: {} published, {} delivered, {} dropped",
        prefix, label, stats.published, stats.delivered, stats.dropped
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate() {
        let stats = PipelineStats {
            duration: Duration::from_secs(2),
            range_topic: TopicStatsSnapshot {
                published: 100,
                delivered: 100,
                dropped: 0,
            },
            ..Default::default()
        };
        assert!((stats.rate_hz() - 50.0).abs() < 1e-9);
        assert_eq!(PipelineStats::default().rate_hz(), 0.0);
    }
}
