//! Scene configuration
//!
//! # Sources (in priority order)
//!
//! 1. Environment: `UMBRA_GRACE_MS`, `UMBRA_SETTLE_MS`, `UMBRA_PUBLIC_DIR`
//! 2. JSON file passed to [`SceneConfig::load`]
//! 3. Defaults
//!
//! # Example File
//!
//! ```json
//! {
//!   "grace_timeout_ms": 500,
//!   "settle_delay_ms": 150,
//!   "public_dir": "public",
//!   "pipeline": {
//!     "bloom": { "intensity": 1.5, "mip_levels": 9 },
//!     "lut_source": "/lut/F-6800-STD.cube"
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use umbra_render::{FileLutResolver, PipelineOptions};

use crate::gate::{GateTimings, DEFAULT_GRACE_TIMEOUT, DEFAULT_SETTLE_DELAY};

/// Environment variable overriding the grace timeout, in milliseconds
pub const ENV_GRACE_MS: &str = "UMBRA_GRACE_MS";
/// Environment variable overriding the settle delay, in milliseconds
pub const ENV_SETTLE_MS: &str = "UMBRA_SETTLE_MS";
/// Environment variable overriding the static asset root
pub const ENV_PUBLIC_DIR: &str = "UMBRA_PUBLIC_DIR";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Per-scene settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Wait this long for a first load before treating assets as loaded
    pub grace_timeout_ms: u64,
    /// Keep the loader up this long after the gate opens
    pub settle_delay_ms: u64,
    /// Directory that site-absolute asset paths resolve against
    pub public_dir: PathBuf,
    /// Post-processing options
    pub pipeline: PipelineOptions,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grace_timeout_ms: DEFAULT_GRACE_TIMEOUT.as_millis() as u64,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            public_dir: PathBuf::from("public"),
            pipeline: PipelineOptions::default(),
        }
    }
}

impl SceneConfig {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let config = Self::load_from_file(path)?;
                log::info!("Loaded scene config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply overrides from `lookup`, which maps variable names to values
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_GRACE_MS) {
            self.grace_timeout_ms = parse_millis(ENV_GRACE_MS, &value)?;
            log::info!("Grace timeout from env: {}ms", self.grace_timeout_ms);
        }

        if let Some(value) = lookup(ENV_SETTLE_MS) {
            self.settle_delay_ms = parse_millis(ENV_SETTLE_MS, &value)?;
            log::info!("Settle delay from env: {}ms", self.settle_delay_ms);
        }

        if let Some(value) = lookup(ENV_PUBLIC_DIR) {
            if !value.is_empty() {
                self.public_dir = PathBuf::from(value);
                log::info!("Public dir from env: {}", self.public_dir.display());
            }
        }

        Ok(())
    }

    /// Grace timeout as a duration
    pub fn grace_timeout(&self) -> Duration {
        Duration::from_millis(self.grace_timeout_ms)
    }

    /// Settle delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Gate timer settings
    pub fn timings(&self) -> GateTimings {
        GateTimings {
            grace_timeout: self.grace_timeout(),
            settle_delay: self.settle_delay(),
        }
    }

    /// Lookup table resolver rooted at [`public_dir`](Self::public_dir)
    pub fn lut_resolver(&self) -> FileLutResolver {
        FileLutResolver::new(&self.public_dir)
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
