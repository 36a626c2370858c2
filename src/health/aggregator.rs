// src/health/aggregator.rs
use super::AggregateResult;
use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::probe::{CacheProbe, DatabaseProbe, MailRelayProbe, Probe};
use chrono::Local;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Runs a set of named probes and reduces their results into one report.
/// Owns no protocol knowledge.
pub struct Aggregator {
    probes: Vec<(String, Box<dyn Probe>)>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            probes: Vec::new(),
            metrics: None,
        }
    }

    /// The standard three-service set: `mysql`, `redis`, `mailhog`.
    pub fn from_config(config: &Config) -> Self {
        let timeout = config.timeout();
        let services = &config.services;

        Self::new()
            .with_probe("mysql", DatabaseProbe::new(services.mysql.clone(), timeout))
            .with_probe("redis", CacheProbe::new(services.redis.clone(), timeout))
            .with_probe(
                "mailhog",
                MailRelayProbe::new(services.mailhog.clone(), timeout, config.smtp_hello_domain.clone()),
            )
    }

    pub fn with_probe<P: Probe + 'static>(mut self, name: impl Into<String>, probe: P) -> Self {
        self.probes.push((name.into(), Box::new(probe)));
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Probe every service concurrently and summarise. Never fails: each
    /// probe already folds its errors into its result.
    pub async fn run(&self) -> AggregateResult {
        let checks = self
            .probes
            .iter()
            .map(|(name, probe)| async move { (name.clone(), probe.run().await) });

        let results: BTreeMap<_, _> = futures::future::join_all(checks).await.into_iter().collect();
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let aggregate = AggregateResult::new(timestamp, results);

        if let Some(metrics) = &self.metrics {
            metrics.record_aggregate(&aggregate);
        }

        info!(
            status = aggregate.overall_status.as_str(),
            healthy = aggregate.healthy_count,
            total = aggregate.total_count,
            "Health check complete: {}",
            aggregate.message
        );

        aggregate
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
