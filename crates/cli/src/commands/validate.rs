//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::BridgeBlueprint;
use contracts::SourceConfig;
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    node: String,
    pose_topic: String,
    range_topic: String,
    queue_depth: usize,
    source: String,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<built-in defaults>".to_string());
    info!(config = %config_path, "Validating configuration");

    match load_blueprint(args.config.as_deref()) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    node: blueprint.node.name.clone(),
                    pose_topic: blueprint.topics.pose.clone(),
                    range_topic: blueprint.topics.range.clone(),
                    queue_depth: blueprint.qos.depth,
                    source: source_kind(&blueprint.source).to_string(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

pub(crate) fn source_kind(source: &SourceConfig) -> &'static str {
    match source {
        SourceConfig::Replay(_) => "replay",
        SourceConfig::Profile(_) => "profile",
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &BridgeBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - range readings are only counted".to_string());
    }

    if blueprint.qos.depth == 1 {
        warnings.push("qos.depth is 1 - bursts will drop samples".to_string());
    }

    if let SourceConfig::Replay(replay) = &blueprint.source {
        if replay.path.as_os_str() != "-" && !replay.path.exists() {
            warnings.push(format!(
                "Replay file '{}' does not exist yet",
                replay.path.display()
            ));
        }
        if replay.loop_playback && replay.speed == 0.0 {
            warnings.push("Looping replay at speed 0 never yields".to_string());
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Node: {}", summary.node);
            println!("  Topics: {} -> {}", summary.pose_topic, summary.range_topic);
            println!("  Queue depth: {}", summary.queue_depth);
            println!("  Source: {}", summary.source);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
