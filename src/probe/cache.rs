// src/probe/cache.rs
use super::{connect, Probe, ProbeError, ProtocolFields};
use crate::config::ServiceConfig;
use crate::protocol::resp;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

const KEY_PREFIX: &str = "healthprobe_";
const PROBE_VALUE: &str = "OK";

/// Liveness probe for the key-value cache. Authenticates if a password is
/// configured, then runs PING, INFO SERVER and a SET/GET/DEL round trip.
///
/// Only connection failures and a rejected AUTH abort the probe; any other
/// unexpected reply just degrades the matching field.
#[derive(Debug, Clone)]
pub struct CacheProbe {
    config: ServiceConfig,
    timeout: Duration,
}

impl CacheProbe {
    pub fn new(config: ServiceConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    async fn authenticate(&self, conn: &mut BufReader<TcpStream>, password: &str) -> Result<(), ProbeError> {
        let request = match self.config.username.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => resp::encode(&["AUTH", user, password]),
            None => resp::encode(&["AUTH", password]),
        };
        let reply = command(conn, &request).await?;

        if !reply.starts_with("+OK") {
            return Err(ProbeError::Authentication(reply.trim().to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Probe for CacheProbe {
    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check(&self) -> Result<ProtocolFields, ProbeError> {
        let mut conn = BufReader::new(connect(&self.config).await?);

        if let Some(password) = self.config.password() {
            self.authenticate(&mut conn, password).await?;
        }

        let ping = command(&mut conn, &resp::encode(&["PING"])).await?;
        let ping = if ping.starts_with("+PONG") { "PONG" } else { "ERROR" };

        let info = bulk_command(&mut conn, &resp::encode(&["INFO", "SERVER"])).await?;
        let version = info
            .as_deref()
            .map(String::from_utf8_lossy)
            .and_then(|info| parse_version(&info).map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        let key = probe_key();
        let set = command(&mut conn, &resp::encode(&["SET", key.as_str(), PROBE_VALUE])).await?;
        debug!(key = %key, reply = %set.trim(), "SET probe key");

        let value = bulk_command(&mut conn, &resp::encode(&["GET", key.as_str()])).await?;
        let write_read = if value.as_deref() == Some(PROBE_VALUE.as_bytes()) {
            "success"
        } else {
            "failed"
        };

        command(&mut conn, &resp::encode(&["DEL", key.as_str()])).await?;
        drop(conn);

        let mut fields = ProtocolFields::new();
        fields.insert("ping".into(), ping.into());
        fields.insert("test_write_read".into(), write_read.into());
        fields.insert("version".into(), version.into());
        Ok(fields)
    }
}

/// Send a request and read the one-line reply.
async fn command(conn: &mut BufReader<TcpStream>, request: &[u8]) -> Result<String, ProbeError> {
    conn.write_all(request).await?;
    conn.flush().await?;
    read_line(conn).await
}

/// Send a request whose reply is a bulk string.
async fn bulk_command(conn: &mut BufReader<TcpStream>, request: &[u8]) -> Result<Option<Vec<u8>>, ProbeError> {
    let header = command(conn, request).await?;
    Ok(resp::decode_bulk(&header, conn).await?)
}

async fn read_line(conn: &mut BufReader<TcpStream>) -> Result<String, ProbeError> {
    let mut line = Vec::new();
    if conn.read_until(b'\n', &mut line).await? == 0 {
        return Err(ProbeError::connection_closed());
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}

fn probe_key() -> String {
    format!("{}{}", KEY_PREFIX, chrono::Utc::now().timestamp())
}

/// Pull `redis_version:<x.y.z>` out of an INFO payload.
pub fn parse_version(info: &str) -> Option<&str> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let re = VERSION.get_or_init(|| Regex::new(r"redis_version:([\d.]+)").expect("valid version pattern"));
    re.captures(info).and_then(|c| c.get(1)).map(|m| m.as_str())
}
