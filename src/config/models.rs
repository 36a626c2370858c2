// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub services: ServicesConfig,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_hello_domain")]
    pub smtp_hello_domain: String,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub mysql: ServiceConfig,
    pub redis: ServiceConfig,
    pub mailhog: ServiceConfig,
}

/// Connection details for a single backend service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_metrics_path")]
    pub path: PathBuf,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_metrics_path(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_hello_domain() -> String {
    "healthprobe.local".to_string()
}

fn default_metrics_path() -> PathBuf {
    PathBuf::from("service_probe.prom")
}

impl ServiceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            database: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// The `host:port` string every probe result reports as its connection.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Username and password, present only when a username is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username
            .as_deref()
            .map(|user| (user, self.password.as_deref().unwrap_or("")))
    }

    /// The password, treating an empty string as absent.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("service '{}' has an empty host", name);
        }
        if self.port == 0 {
            bail!("service '{}' has port 0", name);
        }
        Ok(())
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        self.services.mysql.validate("mysql")?;
        self.services.redis.validate("redis")?;
        self.services.mailhog.validate("mailhog")?;

        if self.services.mysql.database.as_deref().map_or(true, str::is_empty) {
            bail!("service 'mysql' requires a database name");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        if self.smtp_hello_domain.trim().is_empty() {
            bail!("smtp_hello_domain must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            services: ServicesConfig {
                mysql: ServiceConfig::new("mysql_db", 3306)
                    .with_credentials("root", "secret")
                    .with_database("app"),
                redis: ServiceConfig::new("redis_cache", 6379).with_password("secret"),
                mailhog: ServiceConfig::new("mailhog", 1025),
            },
            timeout_secs: default_timeout_secs(),
            smtp_hello_domain: default_hello_domain(),
            metrics: MetricsConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_missing_database_name() {
        let mut config = sample();
        config.services.mysql.database = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_port_and_timeout() {
        let mut config = sample();
        config.services.redis.port = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_password_is_absent() {
        let svc = ServiceConfig::new("redis", 6379).with_password("");
        assert_eq!(svc.password(), None);
        assert_eq!(svc.address(), "redis:6379");

        let svc = ServiceConfig::new("db", 3306).with_credentials("root", "pw");
        assert_eq!(svc.credentials(), Some(("root", "pw")));
    }
}
