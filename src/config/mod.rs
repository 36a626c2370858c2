// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML, JSON or TOML), with `PROBE__*`
/// environment variables layered on top.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let config: Config = ::config::Config::builder()
        .add_source(::config::File::from(path))
        .add_source(
            ::config::Environment::with_prefix("PROBE")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read config file {}", path.display()))?
        .try_deserialize()
        .context("Failed to parse config")?;

    config.validate()?;
    Ok(config)
}
