// src/metrics/collector.rs
use crate::health::AggregateResult;
use crate::probe::ProbeResult;
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Text exposition format of everything recorded so far.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    pub probe_up: IntGaugeVec,
    pub probe_duration_seconds: HistogramVec,
    pub probe_checks_total: IntCounterVec,

    pub healthy_services: IntGauge,
    pub total_services: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probe_up = IntGaugeVec::new(
            Opts::new(
                "probe_up",
                "Service health status (1=healthy, 0=unhealthy)",
            ),
            &["service"],
        )?;
        registry.register(Box::new(probe_up.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "probe_duration_seconds",
                "Duration of successful probes in seconds",
            ),
            &["service"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let probe_checks_total = IntCounterVec::new(
            Opts::new("probe_checks_total", "Total probe runs by outcome"),
            &["service", "outcome"],
        )?;
        registry.register(Box::new(probe_checks_total.clone()))?;

        let healthy_services =
            IntGauge::new("probe_healthy_services", "Number of healthy services")?;
        registry.register(Box::new(healthy_services.clone()))?;

        let total_services =
            IntGauge::new("probe_total_services", "Total number of probed services")?;
        registry.register(Box::new(total_services.clone()))?;

        Ok(Self {
            probe_up,
            probe_duration_seconds,
            probe_checks_total,
            healthy_services,
            total_services,
        })
    }

    pub fn record_probe(&self, service: &str, result: &ProbeResult) {
        let (up, outcome) = if result.is_healthy() {
            (1, "healthy")
        } else {
            (0, "unhealthy")
        };

        self.probe_up.with_label_values(&[service]).set(up);
        self.probe_checks_total
            .with_label_values(&[service, outcome])
            .inc();

        if let Some(ms) = result.response_time_ms() {
            self.probe_duration_seconds
                .with_label_values(&[service])
                .observe(ms / 1000.0);
        }
    }

    pub fn record_aggregate(&self, aggregate: &AggregateResult) {
        for (service, result) in &aggregate.results {
            self.record_probe(service, result);
        }
        self.healthy_services.set(aggregate.healthy_count as i64);
        self.total_services.set(aggregate.total_count as i64);
    }
}
