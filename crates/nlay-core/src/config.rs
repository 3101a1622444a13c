//! TOML configuration for dispatch jobs.
//!
//! ```toml
//! [dispatch]
//! precision = "extended"
//! nmax = 40
//! pec_layer = 0
//! ```
//!
//! Every key is optional. Negative `nmax` / `pec_layer` values are accepted
//! and mean "unset", matching the sentinel convention of the solver.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use nlay_backend::{PrecisionMode, RegistryError};

use crate::types::DispatchOptions;

/// Errors from loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Top-level configuration document.
#[derive(Debug, Default, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub dispatch: DispatchSection,
}

/// The `[dispatch]` table.
#[derive(Debug, Default, Deserialize)]
pub struct DispatchSection {
    /// Precision mode for the job. Default: double.
    #[serde(default)]
    pub precision: PrecisionMode,
    /// Term cap; absent or negative lets the solver decide.
    #[serde(default)]
    pub nmax: Option<i64>,
    /// PEC layer index; absent or negative means none.
    #[serde(default)]
    pub pec_layer: Option<i64>,
}

impl DispatchConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Batch-wide solver options described by this configuration.
    pub fn options(&self) -> DispatchOptions {
        DispatchOptions::from_raw(
            self.dispatch.nmax.unwrap_or(-1),
            self.dispatch.pec_layer.unwrap_or(-1),
        )
    }

    /// Switch the global precision mode to the configured one and return the
    /// dispatch options.
    pub fn apply(&self) -> Result<DispatchOptions, ConfigError> {
        nlay_backend::switch_to(self.dispatch.precision)?;
        Ok(self.options())
    }
}

/// Load and parse a TOML configuration file.
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    log::debug!("Loaded dispatch config from {}", path.display());
    DispatchConfig::from_toml_str(&content)
}
