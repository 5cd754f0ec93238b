//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::BridgeBlueprint;
use contracts::{resolve_topic_name, SourceConfig};
use range_sensor::SensorModel;
use serde::Serialize;
use std::collections::HashMap;

use super::load_blueprint;
use super::validate::source_kind;
use crate::cli::InfoArgs;

/// Sensor + wiring info for JSON output
#[derive(Serialize)]
struct SensorInfo {
    version: String,
    sensor: ModelInfo,
    node: String,
    topics: TopicInfo,
    qos: QosInfo,
    source: SourceInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    frame_id: String,
    radiation_type: String,
    radiation_value: u8,
    field_of_view: f32,
    min_range: f32,
    max_range: f32,
    sensor_offset: f64,
}

#[derive(Serialize)]
struct TopicInfo {
    pose: String,
    range: String,
}

#[derive(Serialize)]
struct QosInfo {
    depth: usize,
    drop_policy: String,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    detail: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref())?;
    let info = build_sensor_info(&blueprint);

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize sensor info")?;
        println!("{}", json);
    } else {
        print_sensor_info(&info);
    }

    Ok(())
}

fn build_sensor_info(blueprint: &BridgeBlueprint) -> SensorInfo {
    let model = SensorModel::vl53l1x();
    let node = &blueprint.node.name;

    // Validated configs always resolve; fall back to the raw name otherwise
    let resolve =
        |topic: &str| resolve_topic_name(topic, node).unwrap_or_else(|_| topic.to_string());

    let source_detail = match &blueprint.source {
        SourceConfig::Replay(replay) => format!(
            "{} (speed {}x{})",
            replay.path.display(),
            replay.speed,
            if replay.loop_playback { ", looping" } else { "" }
        ),
        SourceConfig::Profile(profile) => format!(
            "{:?} {} -> {} m over {} s at {} Hz",
            profile.shape, profile.start_z, profile.end_z, profile.duration_sec, profile.rate_hz
        ),
    };

    SensorInfo {
        version: format!("{:?}", blueprint.version),
        sensor: ModelInfo {
            frame_id: model.frame_id,
            radiation_type: format!("{:?}", model.radiation_type),
            radiation_value: model.radiation_type.wire_value(),
            field_of_view: model.field_of_view,
            min_range: model.min_range,
            max_range: model.max_range,
            sensor_offset: range_sensor::SENSOR_OFFSET,
        },
        node: node.clone(),
        topics: TopicInfo {
            pose: resolve(&blueprint.topics.pose),
            range: resolve(&blueprint.topics.range),
        },
        qos: QosInfo {
            depth: blueprint.qos.depth,
            drop_policy: blueprint.qos.drop_policy.as_str().to_string(),
        },
        source: SourceInfo {
            kind: source_kind(&blueprint.source).to_string(),
            detail: source_detail,
        },
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
                params: s.params.clone(),
            })
            .collect(),
    }
}

fn print_sensor_info(info: &SensorInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Fake Range Sensor (VL53L1X)                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let sensor = &info.sensor;
    println!("📡 Sensor");
    println!("   ├─ Frame: {}", sensor.frame_id);
    println!(
        "   ├─ Radiation: {} ({})",
        sensor.radiation_type, sensor.radiation_value
    );
    println!("   ├─ Field of view: {} rad", sensor.field_of_view);
    println!("   ├─ Limits: {} .. {} m", sensor.min_range, sensor.max_range);
    println!("   └─ Offset: {} m (range = offset - z)", sensor.sensor_offset);

    println!("\n🔌 Wiring");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Node: {}", info.node);
    println!("   ├─ Pose topic: {}", info.topics.pose);
    println!("   ├─ Range topic: {}", info.topics.range);
    println!("   ├─ QoS: depth {}, {}", info.qos.depth, info.qos.drop_policy);
    println!("   └─ Source: {} - {}", info.source.kind, info.source.detail);

    if !info.sinks.is_empty() {
        println!("\n📤 Sinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let prefix = if i == info.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({}, capacity {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_info() {
        let info = build_sensor_info(&BridgeBlueprint::default());
        assert_eq!(info.sensor.frame_id, "base_down");
        assert_eq!(info.sensor.min_range, 0.14);
        assert_eq!(info.topics.pose, "/drone/odom");
        assert_eq!(info.topics.range, "/vl53l1x/range");
        assert_eq!(info.qos.drop_policy, "drop_oldest");
        assert_eq!(info.source.kind, "profile");
        assert_eq!(info.sinks.len(), 1);
    }

    #[test]
    fn test_info_serializes() {
        let info = build_sensor_info(&BridgeBlueprint::default());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["sensor"]["radiation_type"], "Infrared");
        assert_eq!(json["sensor"]["radiation_value"], 1);
        assert_eq!(json["qos"]["depth"], 10);
    }
}
