// src/health/status.rs
use crate::probe::ProbeResult;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Partial,
    Unhealthy,
}

impl OverallStatus {
    /// `Healthy` only when every service is healthy, `Unhealthy` when none
    /// is (including an empty set), `Partial` otherwise.
    pub fn from_counts(healthy: usize, total: usize) -> Self {
        if healthy == 0 {
            OverallStatus::Unhealthy
        } else if healthy == total {
            OverallStatus::Healthy
        } else {
            OverallStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Partial => "partial",
            OverallStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Combined report for one probing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub timestamp: String,
    pub results: BTreeMap<String, ProbeResult>,
    pub overall_status: OverallStatus,
    pub healthy_count: usize,
    pub total_count: usize,
    pub health_percentage: f64,
    pub message: String,
}

impl AggregateResult {
    pub fn new(timestamp: impl Into<String>, results: BTreeMap<String, ProbeResult>) -> Self {
        let total_count = results.len();
        let healthy_count = results.values().filter(|r| r.is_healthy()).count();
        let overall_status = OverallStatus::from_counts(healthy_count, total_count);

        Self {
            timestamp: timestamp.into(),
            results,
            overall_status,
            healthy_count,
            total_count,
            health_percentage: health_percentage(healthy_count, total_count),
            message: summary_message(overall_status, healthy_count, total_count),
        }
    }

    pub fn result(&self, service: &str) -> Option<&ProbeResult> {
        self.results.get(service)
    }
}

/// `100 * healthy / total`, rounded to one decimal. An empty set is 0.
pub fn health_percentage(healthy: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = healthy as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

fn summary_message(status: OverallStatus, healthy: usize, total: usize) -> String {
    match status {
        OverallStatus::Healthy => "all services are reachable".to_string(),
        OverallStatus::Partial => format!("{}/{} services healthy", healthy, total),
        OverallStatus::Unhealthy => "no services are responding".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn results(healthy: usize) -> BTreeMap<String, ProbeResult> {
        ["mailhog", "mysql", "redis"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let result = if i < healthy {
                    ProbeResult::healthy(format!("{}:1", name), Duration::from_millis(1), Default::default())
                } else {
                    ProbeResult::unhealthy(format!("{}:1", name), "Connection failed: refused")
                };
                (name.to_string(), result)
            })
            .collect()
    }

    #[test]
    fn test_status_for_every_count() {
        let expected = [
            (0, OverallStatus::Unhealthy, 0.0),
            (1, OverallStatus::Partial, 33.3),
            (2, OverallStatus::Partial, 66.7),
            (3, OverallStatus::Healthy, 100.0),
        ];

        for (healthy, status, pct) in expected {
            let aggregate = AggregateResult::new("2024-01-01 00:00:00", results(healthy));
            assert_eq!(aggregate.healthy_count, healthy);
            assert_eq!(aggregate.total_count, 3);
            assert_eq!(aggregate.overall_status, status, "healthy={}", healthy);
            assert_eq!(aggregate.health_percentage, pct, "healthy={}", healthy);
            assert!((0.0..=100.0).contains(&aggregate.health_percentage));
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(AggregateResult::new("t", results(3)).message, "all services are reachable");
        assert_eq!(AggregateResult::new("t", results(2)).message, "2/3 services healthy");
        assert_eq!(AggregateResult::new("t", results(0)).message, "no services are responding");
    }

    #[test]
    fn test_empty_set_is_unhealthy() {
        let aggregate = AggregateResult::new("t", BTreeMap::new());
        assert_eq!(aggregate.overall_status, OverallStatus::Unhealthy);
        assert_eq!(aggregate.health_percentage, 0.0);
    }
}
