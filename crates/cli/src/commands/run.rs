//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::{BridgeBlueprint, ConfigLoader};
use contracts::{ReplayConfig, SourceConfig};
use std::time::Duration;
use tracing::{error, info};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;
    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint).context("Invalid configuration after CLI overrides")?;

    info!(
        node = %blueprint.node.name,
        pose_topic = %blueprint.topics.pose,
        range_topic = %blueprint.topics.range,
        depth = blueprint.qos.depth,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    let pipeline_config = PipelineConfig {
        blueprint,
        max_readings: (args.max_readings > 0).then_some(args.max_readings),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    info!("Starting pipeline...");
    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    stats.print_summary();
    info!(reason = %stats.stop_reason, "Fake range sensor finished");
    Ok(())
}

/// Apply `--replay*` flags on top of the loaded configuration
fn apply_overrides(blueprint: &mut BridgeBlueprint, args: &RunArgs) {
    if let Some(path) = &args.replay {
        info!(replay = %path.display(), "Overriding pose source from CLI");
        blueprint.source = SourceConfig::Replay(ReplayConfig {
            path: path.clone(),
            speed: args.replay_speed.unwrap_or(1.0),
            loop_playback: args.replay_loop,
        });
        return;
    }

    if let SourceConfig::Replay(replay) = &mut blueprint.source {
        if let Some(speed) = args.replay_speed {
            replay.speed = speed;
        }
        if args.replay_loop {
            replay.loop_playback = true;
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
