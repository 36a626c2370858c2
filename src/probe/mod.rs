// src/probe/mod.rs
//
// Each probe is a fault-isolation boundary: whatever goes wrong inside
// `check` is folded into `ProbeResult::Unhealthy` by `run`, so callers never
// see an error.
mod cache;
mod database;
mod error;
mod mail;
mod result;

pub use cache::CacheProbe;
pub use database::{DatabaseProbe, MySqlDriver, ServerInfo, SqlDriver};
pub use error::ProbeError;
pub use mail::MailRelayProbe;
pub use result::{FieldValue, ProbeResult, ProtocolFields};

use crate::config::ServiceConfig;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

#[async_trait]
pub trait Probe: Send + Sync {
    fn config(&self) -> &ServiceConfig;

    /// Upper bound for the whole exchange, connect included.
    fn timeout(&self) -> Duration;

    /// Speak the service's protocol once and collect its diagnostics.
    async fn check(&self) -> Result<ProtocolFields, ProbeError>;

    async fn run(&self) -> ProbeResult {
        let addr = self.config().address();
        let start = Instant::now();
        debug!(addr = %addr, "probe starting");

        let outcome = match timeout(self.timeout(), self.check()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout(self.timeout())),
        };
        let elapsed = start.elapsed();

        match outcome {
            Ok(fields) => {
                debug!(addr = %addr, elapsed_ms = elapsed.as_millis() as u64, "probe succeeded");
                ProbeResult::healthy(addr, elapsed, fields)
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "probe failed");
                ProbeResult::unhealthy(addr, e)
            }
        }
    }
}

/// Open a socket to the service. The stream is owned by the caller and
/// closed when dropped, on every exit path.
pub(crate) async fn connect(config: &ServiceConfig) -> Result<TcpStream, ProbeError> {
    let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}
