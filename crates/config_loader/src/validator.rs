//! 配置校验模块
//!
//! 校验规则：
//! - 节点名非空且合法
//! - pose / range 话题名合法且互不相同
//! - qos.depth >= 1
//! - 回放 speed >= 0；剖面 rate_hz >= 0.001、0 < duration_sec <= 一年
//! - sink 名称非空且唯一，queue_capacity >= 1，必填参数齐全

use std::collections::HashSet;

use contracts::{
    resolve_topic_name, BridgeBlueprint, ContractError, ProfileConfig, SinkType, SourceConfig,
};

/// 校验 BridgeBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    validate_node(blueprint)?;
    validate_topics(blueprint)?;
    validate_qos(blueprint)?;
    validate_source(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验节点名
fn validate_node(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let name = &blueprint.node.name;
    if name.is_empty() {
        return Err(ContractError::config_validation(
            "node.name",
            "node name cannot be empty",
        ));
    }
    if name.starts_with(|c: char| c.is_ascii_digit())
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ContractError::config_validation(
            "node.name",
            format!("node name '{name}' must match [A-Za-z_][A-Za-z0-9_]*"),
        ));
    }
    Ok(())
}

/// 校验话题名 (解析后比较，`drone/odom` 与 `/drone/odom` 视为同一话题)
fn validate_topics(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let node = &blueprint.node.name;
    let pose = resolve_topic_name(&blueprint.topics.pose, node).map_err(|e| {
        ContractError::config_validation("topics.pose", e.to_string())
    })?;
    let range = resolve_topic_name(&blueprint.topics.range, node).map_err(|e| {
        ContractError::config_validation("topics.range", e.to_string())
    })?;

    if pose == range {
        return Err(ContractError::config_validation(
            "topics",
            format!("pose and range topics must differ, both resolve to '{pose}'"),
        ));
    }
    Ok(())
}

/// 校验队列 QoS
fn validate_qos(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    if blueprint.qos.depth == 0 {
        return Err(ContractError::config_validation(
            "qos.depth",
            "depth must be >= 1",
        ));
    }
    Ok(())
}

/// 校验位姿来源
fn validate_source(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    match &blueprint.source {
        SourceConfig::Replay(replay) => {
            if replay.path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    "source.path",
                    "replay path cannot be empty",
                ));
            }
            if !(replay.speed.is_finite() && replay.speed >= 0.0) {
                return Err(ContractError::config_validation(
                    "source.speed",
                    format!("speed must be >= 0, got {}", replay.speed),
                ));
            }
        }
        SourceConfig::Profile(profile) => {
            if !(profile.rate_hz.is_finite() && profile.rate_hz >= ProfileConfig::MIN_RATE_HZ) {
                return Err(ContractError::config_validation(
                    "source.rate_hz",
                    format!(
                        "rate_hz must be >= {}, got {}",
                        ProfileConfig::MIN_RATE_HZ,
                        profile.rate_hz
                    ),
                ));
            }
            if !(profile.duration_sec > 0.0
                && profile.duration_sec <= ProfileConfig::MAX_DURATION_SEC)
            {
                return Err(ContractError::config_validation(
                    "source.duration_sec",
                    format!(
                        "duration_sec must be in (0, {}], got {}",
                        ProfileConfig::MAX_DURATION_SEC,
                        profile.duration_sec
                    ),
                ));
            }
            if !(profile.start_z.is_finite() && profile.end_z.is_finite()) {
                return Err(ContractError::config_validation(
                    "source.start_z / source.end_z",
                    "start_z and end_z must be finite",
                ));
            }
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be >= 1",
            ));
        }

        let required = match sink.sink_type {
            SinkType::Log => None,
            SinkType::File => Some("path"),
            SinkType::Network => Some("addr"),
        };
        if let Some(param) = required {
            if !sink.params.contains_key(param) {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.{}", sink.name, param),
                    format!("{:?} sink requires '{}'", sink.sink_type, param),
                ));
            }
        }
    }
    Ok(())
}
