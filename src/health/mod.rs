// src/health/mod.rs
mod aggregator;
mod status;

pub use aggregator::Aggregator;
pub use status::{health_percentage, AggregateResult, OverallStatus};
