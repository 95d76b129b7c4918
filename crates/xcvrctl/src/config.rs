//! Configuration for xcvrctl.
//!
//! Loads settings from bootflash or /etc, or uses defaults. Every field has a
//! default, so a partial file is fine.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Config file path on the switch
pub const CONFIG_PATH: &str = "/bootflash/xcvrctl/config.toml";

/// Fallback config file path
pub const FALLBACK_CONFIG_PATH: &str = "/etc/xcvrctl/config.toml";

/// How device commands are executed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    /// Program that executes a device CLI command
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the command
    #[serde(default = "default_program_args")]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "vsh".to_string()
}

fn default_program_args() -> Vec<String> {
    vec!["-c".to_string()]
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_program_args(),
        }
    }
}

/// Status-mode fan-out limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryConfig {
    /// SPROM queries in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-query timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    10
}

fn default_timeout() -> u64 {
    30
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout(),
        }
    }
}

impl QueryConfig {
    /// Concurrency limit, never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent.max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

impl Config {
    /// Load from an explicit path, or search the standard locations.
    ///
    /// An explicit path that cannot be read is an error; the standard
    /// locations fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from the first standard location that parses, or return defaults
    pub fn load_default() -> Self {
        for path in [CONFIG_PATH, FALLBACK_CONFIG_PATH] {
            let path = Path::new(path);
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(path) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring config {}: {:#}", path.display(), e),
            }
        }
        debug!("No config file found, using defaults");
        Config::default()
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
