// src/probe/mail.rs
use super::{connect, Probe, ProbeError, ProtocolFields};
use crate::config::ServiceConfig;
use crate::protocol::smtp;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Liveness probe for the SMTP relay: expects a `220` greeting, says HELO,
/// then quits.
#[derive(Debug, Clone)]
pub struct MailRelayProbe {
    config: ServiceConfig,
    timeout: Duration,
    hello_domain: String,
}

impl MailRelayProbe {
    pub fn new(config: ServiceConfig, timeout: Duration, hello_domain: impl Into<String>) -> Self {
        Self {
            config,
            timeout,
            hello_domain: hello_domain.into(),
        }
    }
}

#[async_trait]
impl Probe for MailRelayProbe {
    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check(&self) -> Result<ProtocolFields, ProbeError> {
        let mut conn = BufReader::new(connect(&self.config).await?);

        let greeting = read_line(&mut conn).await?;
        if !smtp::is_ready(&greeting) {
            return Err(ProbeError::UnexpectedGreeting(greeting.trim().to_string()));
        }

        conn.write_all(&smtp::hello(&self.hello_domain)).await?;
        conn.flush().await?;
        let hello_reply = read_line(&mut conn).await?;

        // The session is over either way; a relay that hangs up early on
        // QUIT is still healthy.
        let _ = conn.write_all(&smtp::quit()).await;
        drop(conn);

        let mut fields = ProtocolFields::new();
        fields.insert("smtp_response".into(), greeting.trim().into());
        fields.insert("elo_response".into(), hello_reply.trim().into());
        Ok(fields)
    }
}

async fn read_line(conn: &mut BufReader<TcpStream>) -> Result<String, ProbeError> {
    let mut line = Vec::new();
    if conn.read_until(b'\n', &mut line).await? == 0 {
        return Err(ProbeError::connection_closed());
    }
    Ok(String::from_utf8_lossy(&line).into_owned())
}
