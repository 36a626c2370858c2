// src/lib.rs
pub mod config;
pub mod health;
pub mod metrics;
pub mod probe;
pub mod protocol;

pub use crate::config::{Config, ServiceConfig};
pub use crate::health::{AggregateResult, Aggregator, OverallStatus};
pub use crate::probe::{Probe, ProbeError, ProbeResult};
