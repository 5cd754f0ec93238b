//! 消息定义
//!
//! 入站 `PoseSample` (里程计) 与出站 `RangeReading` (测距传感器)。
//! 字段布局与 nav_msgs/Odometry、sensor_msgs/Range 保持一致。

use serde::{Deserialize, Serialize};

/// 时间戳 (ROS builtin_interfaces/Time 布局)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time {
    /// 秒
    pub sec: i32,

    /// 纳秒 [0, 1e9)
    pub nanosec: u32,
}

impl Time {
    const NANOS_PER_SEC: f64 = 1_000_000_000.0;

    /// 构造时间戳
    pub fn new(sec: i32, nanosec: u32) -> Self {
        Self { sec, nanosec }
    }

    /// 从浮点秒构造 (向下取整到秒，余数转纳秒)
    pub fn from_secs_f64(secs: f64) -> Self {
        let sec = secs.floor();
        let mut nanosec = ((secs - sec) * Self::NANOS_PER_SEC).round() as u32;
        let mut sec = sec as i32;
        if nanosec >= 1_000_000_000 {
            sec += 1;
            nanosec -= 1_000_000_000;
        }
        Self { sec, nanosec }
    }

    /// 转为浮点秒
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 / Self::NANOS_PER_SEC
    }
}

/// 消息头
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// 坐标系 ID
    #[serde(default)]
    pub frame_id: String,

    /// 时间戳
    #[serde(default)]
    pub stamp: Time,
}

/// 3D 点 (米)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// 四元数姿态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "default_w")]
    pub w: f64,
}

fn default_w() -> f64 {
    1.0
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// 位姿
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub orientation: Quaternion,
}

/// 带协方差的位姿 (协方差不参与测距模型，不携带)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovariance {
    #[serde(default)]
    pub pose: Pose,
}

/// 位姿遥测样本
///
/// 竖直坐标 `pose.pose.position.z` 使用 NED 约定：向下为正，
/// 所以高度越高 z 越小 (越负)。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// 消息头 (时间戳不参与测距模型)
    #[serde(default)]
    pub header: Header,

    /// 机体坐标系 ID
    #[serde(default)]
    pub child_frame_id: String,

    /// 位姿
    #[serde(default)]
    pub pose: PoseWithCovariance,
}

impl PoseSample {
    /// 仅指定竖直坐标的样本
    pub fn at_position_z(z: f64) -> Self {
        let mut sample = Self::default();
        sample.pose.pose.position.z = z;
        sample
    }

    /// 竖直坐标 (NED, 米)
    pub fn position_z(&self) -> f64 {
        self.pose.pose.position.z
    }
}

/// 辐射类型 (sensor_msgs/Range 线格式取值)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum RadiationType {
    Ultrasound = 0,
    Infrared = 1,
}

impl RadiationType {
    /// 线格式取值
    pub fn wire_value(self) -> u8 {
        self as u8
    }
}

/// 测距读数
///
/// `range` 不会被限制在 `[min_range, max_range]` 内，超出量程的值原样发布，
/// 由消费方通过 [`RangeReading::is_within_limits`] 自行判断。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeReading {
    /// 消息头
    pub header: Header,

    /// 辐射类型
    pub radiation_type: RadiationType,

    /// 视场角 (弧度)
    pub field_of_view: f32,

    /// 最小量程 (米)
    pub min_range: f32,

    /// 最大量程 (米)
    pub max_range: f32,

    /// 测距值 (米)
    pub range: f32,
}

impl RangeReading {
    /// 读数是否位于传感器量程之内
    pub fn is_within_limits(&self) -> bool {
        self.range >= self.min_range && self.range <= self.max_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_from_secs() {
        let t = Time::from_secs_f64(12.25);
        assert_eq!(t.sec, 12);
        assert_eq!(t.nanosec, 250_000_000);
        assert!((t.as_secs_f64() - 12.25).abs() < 1e-9);
    }

    #[test]
    fn test_time_negative_secs() {
        let t = Time::from_secs_f64(-0.5);
        assert_eq!(t.sec, -1);
        assert_eq!(t.nanosec, 500_000_000);
    }

    #[test]
    fn test_pose_sample_sparse_json() {
        let line = r#"{"pose":{"pose":{"position":{"z":-1.5}}}}"#;
        let sample: PoseSample = serde_json::from_str(line).unwrap();
        assert_eq!(sample.position_z(), -1.5);
        assert_eq!(sample.pose.pose.orientation.w, 1.0);
        assert_eq!(sample.header.stamp, Time::default());
    }

    #[test]
    fn test_radiation_type_wire() {
        assert_eq!(RadiationType::Ultrasound.wire_value(), 0);
        assert_eq!(RadiationType::Infrared.wire_value(), 1);
        let json = serde_json::to_string(&RadiationType::Infrared).unwrap();
        assert_eq!(json, "\"INFRARED\"");
    }

    #[test]
    fn test_within_limits() {
        let mut reading = RangeReading {
            header: Header::default(),
            radiation_type: RadiationType::Infrared,
            field_of_view: 0.47,
            min_range: 0.14,
            max_range: 3.0,
            range: 1.0,
        };
        assert!(reading.is_within_limits());

        reading.range = -3.45;
        assert!(!reading.is_within_limits());

        reading.range = 3.5;
        assert!(!reading.is_within_limits());
    }
}
