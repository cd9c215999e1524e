//! Environment overrides recognised by the config resolver.
//!
//! Read from `LOOM_*` process variables through the `config` crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LoomError;
use crate::types::ModuleFormat;

/// Fallback dev-server and HMR port.
pub const DEFAULT_SERVER_PORT: u16 = 9000;

/// `LOOM_*` environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvOverrides {
    /// `LOOM_CONFIG_FORMAT`: module format used to compile the config file.
    pub config_format: Option<ModuleFormat>,
    /// `LOOM_CONFIG_FULL_BUNDLE`: bundle `node_modules` into the compiled
    /// config instead of externalizing bare imports.
    pub config_full_bundle: Option<bool>,
    /// `LOOM_DEFAULT_SERVER_PORT`: dev-server port when none is configured.
    pub default_server_port: Option<u16>,
    /// `LOOM_DEFAULT_HMR_PORT`: HMR port when none is configured.
    pub default_hmr_port: Option<u16>,
    /// `LOOM_PROFILE`: compiler profiling (never applied to the config
    /// file's own compilation).
    pub profile: Option<bool>,
}

impl EnvOverrides {
    /// Loads overrides from the process environment.
    pub fn load() -> Result<Self, LoomError> {
        Self::build(None)
    }

    /// Loads overrides from an explicit variable map instead of the process
    /// environment.
    pub fn from_map(vars: HashMap<String, String>) -> Result<Self, LoomError> {
        Self::build(Some(vars))
    }

    fn build(source: Option<HashMap<String, String>>) -> Result<Self, LoomError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("LOOM")
                    .try_parsing(true)
                    .source(source),
            )
            .build()
            .map_err(|e| LoomError::configuration(format!("Failed to read LOOM_* overrides: {e}")))?;

        config.try_deserialize().map_err(|e| {
            LoomError::configuration(format!("Failed to deserialize LOOM_* overrides: {e}"))
        })
    }

    /// Dev-server port fallback.
    pub fn server_port(&self) -> u16 {
        self.default_server_port.unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Whether the config file is fully bundled.
    pub fn full_bundle(&self) -> bool {
        self.config_full_bundle.unwrap_or(false)
    }
}
