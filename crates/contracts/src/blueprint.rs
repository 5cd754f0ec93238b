//! BridgeBlueprint - Config Loader 输出
//!
//! 描述宿主进程的接线：节点名、话题、队列 QoS、位姿来源、输出路由。
//! 传感器模型本身没有可配置项。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的桥接配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 节点设置
    #[serde(default)]
    pub node: NodeConfig,

    /// 话题名称
    #[serde(default)]
    pub topics: TopicConfig,

    /// 队列 QoS
    #[serde(default)]
    pub qos: QosProfile,

    /// 位姿来源
    #[serde(default)]
    pub source: SourceConfig,

    /// 输出路由配置
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

/// 节点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// 节点名称
    #[serde(default = "default_node_name")]
    pub name: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
        }
    }
}

fn default_node_name() -> String {
    "fake_sensor".to_string()
}

/// 话题配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    /// 入站位姿话题
    #[serde(default = "default_pose_topic")]
    pub pose: String,

    /// 出站测距话题
    #[serde(default = "default_range_topic")]
    pub range: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            pose: default_pose_topic(),
            range: default_range_topic(),
        }
    }
}

fn default_pose_topic() -> String {
    "drone/odom".to_string()
}

fn default_range_topic() -> String {
    "vl53l1x/range".to_string()
}

/// 队列 QoS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosProfile {
    /// 每个订阅的队列深度
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// 队列满时的丢弃策略
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl QosProfile {
    /// 指定深度，默认丢弃最旧
    pub fn keep_last(depth: usize) -> Self {
        Self {
            depth,
            drop_policy: DropPolicy::DropOldest,
        }
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        Self::keep_last(default_depth())
    }
}

fn default_depth() -> usize {
    10
}

/// 丢包策略 (队列满时)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// 丢弃最旧的消息
    #[default]
    DropOldest,
    /// 丢弃最新的消息
    DropNewest,
}

impl DropPolicy {
    /// 指标标签
    pub fn as_str(&self) -> &'static str {
        match self {
            DropPolicy::DropOldest => "drop_oldest",
            DropPolicy::DropNewest => "drop_newest",
        }
    }
}

/// 位姿来源配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// 回放 JSONL 录制文件
    Replay(ReplayConfig),
    /// 脚本化高度剖面
    Profile(ProfileConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Profile(ProfileConfig::default())
    }
}

/// 回放配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSONL 文件路径 (`-` 表示 stdin)
    pub path: PathBuf,

    /// 回放速度倍率 (1.0 = 原速, 0 = 尽快)
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// 是否循环回放
    #[serde(default)]
    pub loop_playback: bool,
}

fn default_speed() -> f64 {
    1.0
}

/// 高度剖面配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// 剖面形状
    #[serde(default)]
    pub shape: ProfileShape,

    /// 采样频率 (Hz)，必须 > 0
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// 持续时间 (秒)，必须 > 0
    #[serde(default = "default_duration_sec")]
    pub duration_sec: f64,

    /// 起始 z (NED, 米)
    #[serde(default)]
    pub start_z: f64,

    /// 终止 z (NED, 米)
    #[serde(default = "default_end_z")]
    pub end_z: f64,
}

impl ProfileConfig {
    /// 最低采样频率 (Hz)，保证采样周期可表示
    pub const MIN_RATE_HZ: f64 = 0.001;

    /// 最长持续时间 (秒，一年)
    pub const MAX_DURATION_SEC: f64 = 365.0 * 24.0 * 3600.0;
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            shape: ProfileShape::default(),
            rate_hz: default_rate_hz(),
            duration_sec: default_duration_sec(),
            start_z: 0.0,
            end_z: default_end_z(),
        }
    }
}

fn default_rate_hz() -> f64 {
    50.0
}

fn default_duration_sec() -> f64 {
    10.0
}

fn default_end_z() -> f64 {
    -2.0
}

/// 剖面形状
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileShape {
    /// 保持 start_z
    Constant,
    /// 从 start_z 线性变化到 end_z
    #[default]
    Ramp,
    /// 在 start_z 与 end_z 之间正弦往返 (一个周期)
    Sine,
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig {
        name: "log".to_string(),
        sink_type: SinkType::Log,
        queue_capacity: default_queue_capacity(),
        params: HashMap::new(),
    }]
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 日志输出
    Log,
    /// 文件输出 (JSON lines)
    File,
    /// 网络输出 (UDP)
    Network,
}

/// 原始节点的接线：fake_sensor, drone/odom -> vl53l1x/range, depth 10
impl Default for BridgeBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            node: NodeConfig::default(),
            topics: TopicConfig::default(),
            qos: QosProfile::default(),
            source: SourceConfig::default(),
            sinks: default_sinks(),
        }
    }
}
