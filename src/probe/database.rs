// src/probe/database.rs
use super::{Probe, ProbeError, ProtocolFields};
use crate::config::ServiceConfig;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use sqlx::{ConnectOptions, Connection, Row};
use std::time::Duration;
use tracing::debug;

const SERVER_INFO_QUERY: &str = "SELECT VERSION() AS version, CAST(NOW() AS CHAR) AS server_time";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub version: String,
    pub server_time: String,
}

/// Seam between the database probe and the SQL driver that talks to the
/// server. Implementations open a connection, read the server's version and
/// clock, and release the connection before returning.
#[async_trait]
pub trait SqlDriver: Send + Sync {
    async fn server_info(&self, config: &ServiceConfig) -> Result<ServerInfo, ProbeError>;
}

/// `SqlDriver` backed by sqlx's MySQL client.
#[derive(Debug, Clone, Default)]
pub struct MySqlDriver;

impl MySqlDriver {
    fn connect_options(config: &ServiceConfig) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .ssl_mode(MySqlSslMode::Disabled)
            .charset("utf8mb4");

        if let Some((user, password)) = config.credentials() {
            options = options.username(user).password(password);
        }
        if let Some(database) = config.database.as_deref() {
            options = options.database(database);
        }
        options
    }
}

#[async_trait]
impl SqlDriver for MySqlDriver {
    async fn server_info(&self, config: &ServiceConfig) -> Result<ServerInfo, ProbeError> {
        let mut conn = Self::connect_options(config)
            .connect()
            .await
            .map_err(|e| ProbeError::Database(e.to_string()))?;

        let row = sqlx::query(SERVER_INFO_QUERY).fetch_one(&mut conn).await;

        // Close before looking at the query outcome so the connection is
        // released on both paths.
        if let Err(e) = conn.close().await {
            debug!(error = %e, "error closing database connection");
        }

        let row = row.map_err(|e| ProbeError::Database(e.to_string()))?;
        Ok(ServerInfo {
            version: row.try_get("version").map_err(|e| ProbeError::Database(e.to_string()))?,
            server_time: row.try_get("server_time").map_err(|e| ProbeError::Database(e.to_string()))?,
        })
    }
}

/// Liveness probe for the relational database: one short-lived connection,
/// one metadata query.
#[derive(Debug, Clone)]
pub struct DatabaseProbe<D = MySqlDriver> {
    config: ServiceConfig,
    timeout: Duration,
    driver: D,
}

impl DatabaseProbe<MySqlDriver> {
    pub fn new(config: ServiceConfig, timeout: Duration) -> Self {
        Self::with_driver(config, timeout, MySqlDriver)
    }
}

impl<D: SqlDriver> DatabaseProbe<D> {
    pub fn with_driver(config: ServiceConfig, timeout: Duration, driver: D) -> Self {
        Self { config, timeout, driver }
    }
}

#[async_trait]
impl<D: SqlDriver> Probe for DatabaseProbe<D> {
    fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn check(&self) -> Result<ProtocolFields, ProbeError> {
        let info = self.driver.server_info(&self.config).await?;

        let mut fields = ProtocolFields::new();
        fields.insert("version".into(), info.version.into());
        fields.insert("server_time".into(), info.server_time.into());
        Ok(fields)
    }
}
