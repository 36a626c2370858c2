// src/main.rs
use anyhow::{Context, Result};
use service_probe::{
    config,
    metrics::MetricsRegistry,
    Aggregator, OverallStatus,
};
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("service_probe=info".parse()?),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "probe.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path)?;

    let metrics_registry = MetricsRegistry::new()?;
    let mut aggregator = Aggregator::from_config(&config);
    if config.metrics.enabled {
        aggregator = aggregator.with_metrics(metrics_registry.collector());
    }

    let report = aggregator.run().await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if config.metrics.enabled {
        tokio::fs::write(&config.metrics.path, metrics_registry.gather()?)
            .await
            .with_context(|| format!("Failed to write metrics to {}", config.metrics.path.display()))?;
        info!("Metrics written to {}", config.metrics.path.display());
    }

    Ok(match report.overall_status {
        OverallStatus::Healthy => ExitCode::SUCCESS,
        OverallStatus::Partial => ExitCode::from(1),
        OverallStatus::Unhealthy => ExitCode::from(2),
    })
}
