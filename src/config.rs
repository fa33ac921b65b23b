//! Application configuration.
//!
//! Layered from serde defaults, an optional TOML file, and `KEX_*`
//! environment variables (e.g. `KEX_SERVER__PORT=9000`).

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8420,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle minutes before a session becomes eligible for eviction.
    pub timeout_minutes: u64,
    /// Seconds between reaper passes.
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: crate::session::DEFAULT_TIMEOUT_MINUTES,
            cleanup_interval_seconds: crate::session::DEFAULT_CLEANUP_INTERVAL_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent executable to spawn for codebase queries.
    pub executable: String,
    /// Space-separated tool allowlist passed to the agent.
    pub allowed_tools: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let defaults = crate::agent::AgentCliConfig::default();
        Self {
            executable: defaults.executable,
            allowed_tools: defaults.allowed_tools,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "kex.db".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, optionally merging a TOML file over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("KEX").separator("__"))
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("parsing configuration")
    }
}
