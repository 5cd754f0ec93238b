//! 运行指标
//!
//! Prometheus 指标通过 `metrics` facade 记录；未安装 recorder 时为空操作。
//! `RangeStatsAggregator` 在内存中聚合测距读数，用于运行结束时的摘要。

use contracts::RangeReading;
use metrics::{counter, gauge, histogram};

/// 记录话题发布
pub fn record_message_published(topic: &str) {
    counter!(
        "fake_sensor_messages_published_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// 记录话题投递 (回调被调用)
pub fn record_message_delivered(topic: &str) {
    counter!(
        "fake_sensor_messages_delivered_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// 记录队列溢出丢弃
pub fn record_message_dropped(topic: &str, policy: &str) {
    counter!(
        "fake_sensor_messages_dropped_total",
        "topic" => topic.to_string(),
        "policy" => policy.to_string()
    )
    .increment(1);
}

/// 记录 sink 写入结果
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "fake_sensor_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录一次测距读数
pub fn record_range_reading(range: f32, in_envelope: bool) {
    let envelope = if in_envelope { "inside" } else { "outside" };
    counter!(
        "fake_sensor_range_readings_total",
        "envelope" => envelope.to_string()
    )
    .increment(1);
    gauge!("fake_sensor_range_last_m").set(range as f64);
    histogram!("fake_sensor_range_m").record(range as f64);
}

/// 测距读数聚合器
#[derive(Debug, Clone, Default)]
pub struct RangeStatsAggregator {
    /// 读数总数
    pub total_readings: u64,

    /// 低于 min_range 的读数
    pub below_min: u64,

    /// 高于 max_range 的读数
    pub above_max: u64,

    /// 量程统计 (米)
    pub range_stats: RunningStats,
}

impl RangeStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, reading: &RangeReading) {
        self.total_readings += 1;
        if reading.range < reading.min_range {
            self.below_min += 1;
        } else if reading.range > reading.max_range {
            self.above_max += 1;
        }
        self.range_stats.push(reading.range as f64);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RangeSummary {
        let outside = self.below_min + self.above_max;
        RangeSummary {
            total_readings: self.total_readings,
            below_min: self.below_min,
            above_max: self.above_max,
            outside_rate: if self.total_readings > 0 {
                outside as f64 / self.total_readings as f64 * 100.0
            } else {
                0.0
            },
            range_m: StatsSummary::from(&self.range_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 测距摘要
#[derive(Debug, Clone, Default)]
pub struct RangeSummary {
    pub total_readings: u64,
    pub below_min: u64,
    pub above_max: u64,
    pub outside_rate: f64,
    pub range_m: StatsSummary,
}

impl std::fmt::Display for RangeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Range Summary ===")?;
        writeln!(f, "Total readings: {}", self.total_readings)?;
        writeln!(
            f,
            "Outside envelope: {} below min, {} above max ({:.2}%)",
            self.below_min, self.above_max, self.outside_rate
        )?;
        writeln!(f, "Range (m): {}", self.range_m)
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
