//! # Orchestrator Configuration
//!
//! Settings are merged from three sources, later ones overriding earlier:
//!
//! 1. [`OrchestratorConfig::default()`]
//! 2. A TOML file (`orchestrator.toml` in the working directory, or an explicit path)
//! 3. Environment variables prefixed with `ORCHESTRATOR_`
//!
//! ```bash
//! ORCHESTRATOR_DEFAULT_TIMEOUT_MS=2500 RUST_LOG=info cargo run
//! ```

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILENAME: &str = "orchestrator.toml";
pub const CONFIG_ENV_PREFIX: &str = "ORCHESTRATOR_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Timeout for lookups that do not pass their own.
    pub default_timeout_ms: u64,
    /// Capacity of the registry request channel.
    pub buffer_size: usize,
    /// How often the context collaborator sweeps expired entries.
    pub cleanup_interval_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 10_000,
            buffer_size: 32,
            cleanup_interval_secs: 300,
        }
    }
}

impl OrchestratorConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::Invalid("default_timeout_ms must be greater than zero".into()));
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid("buffer_size must be greater than zero".into()));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid("cleanup_interval_secs must be greater than zero".into()));
        }
        Ok(())
    }
}

/// Loads [`OrchestratorConfig`] from defaults, TOML and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn load(&self) -> Result<OrchestratorConfig, ConfigError> {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));

        let mut figment = Figment::new().merge(Serialized::defaults(OrchestratorConfig::default()));
        if path.exists() {
            info!(path = %path.display(), "Loading configuration file");
            figment = figment.merge(Toml::file(&path));
        } else {
            debug!(path = %path.display(), "No configuration file");
        }
        figment = figment.merge(Env::prefixed(CONFIG_ENV_PREFIX));

        let config: OrchestratorConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }
}
