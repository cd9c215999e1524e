//! Config file discovery and loading.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use loom_core::config::UserConfig;
use loom_core::config::env::EnvOverrides;
use loom_core::types::ConfigEnv;
use loom_plugin::PluginEntry;

use crate::bootstrap::ConfigBootstrap;
use crate::error::ConfigError;

/// Conventional config file names, in lookup order.
pub const CONFIG_FILE_NAMES: [&str; 8] = [
    "loom.config.ts",
    "loom.config.js",
    "loom.config.mjs",
    "loom.config.cjs",
    "loom.config.mts",
    "loom.config.cts",
    "loom.config.json",
    "loom.config.toml",
];

/// How a config file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileKind {
    /// A script, compiled by stage-0 and evaluated.
    Script,
    /// Plain JSON.
    Json,
    /// Plain TOML.
    Toml,
}

impl ConfigFileKind {
    /// Classifies a config file by extension.
    pub fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "js" | "mjs" | "cjs" | "mts" | "cts" => Some(Self::Script),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Finds the config file for `root`.
///
/// An explicit path (relative to `root`) must exist. Otherwise the first
/// conventional name present in `root` is used, if any.
pub async fn find_config_file(
    root: &Path,
    explicit: Option<&Path>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(explicit) = explicit {
        let path = root.join(explicit);
        return if is_file(&path).await {
            Ok(Some(path))
        } else {
            Err(ConfigError::ExplicitConfigMissing { path })
        };
    }

    for name in CONFIG_FILE_NAMES {
        let path = root.join(name);
        if is_file(&path).await {
            debug!(file = %path.display(), "Found config file");
            return Ok(Some(path));
        }
    }
    Ok(None)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// The config-file layer.
#[derive(Debug)]
pub struct LoadedConfigFile {
    /// The file the layer came from.
    pub path: PathBuf,
    /// Settings from the file.
    pub layer: UserConfig,
    /// Plugins declared by the file.
    pub plugins: Vec<PluginEntry>,
}

/// Reads config files into a [`UserConfig`] layer.
///
/// Data files are parsed directly. Script files need a
/// [`ConfigBootstrap`]; without one they are rejected.
#[derive(Debug, Clone, Default)]
pub struct ConfigFileLoader {
    bootstrap: Option<ConfigBootstrap>,
}

impl ConfigFileLoader {
    /// Creates a loader for data config files only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader that also evaluates script config files.
    pub fn with_bootstrap(bootstrap: ConfigBootstrap) -> Self {
        Self {
            bootstrap: Some(bootstrap),
        }
    }

    /// Loads `path`. Failures follow the load-failure policy of `env.mode`.
    pub async fn load(
        &self,
        root: &Path,
        path: &Path,
        env: ConfigEnv,
        overrides: &EnvOverrides,
    ) -> Result<LoadedConfigFile, ConfigError> {
        let kind = ConfigFileKind::of(path).ok_or_else(|| ConfigError::UnsupportedConfigFormat {
            path: path.to_path_buf(),
        })?;

        let (value, plugins) = match kind {
            ConfigFileKind::Json => (read_data(path, env, parse_json).await?, Vec::new()),
            ConfigFileKind::Toml => (read_data(path, env, parse_toml).await?, Vec::new()),
            ConfigFileKind::Script => {
                let Some(bootstrap) = &self.bootstrap else {
                    return Err(ConfigError::EvaluatorUnavailable {
                        path: path.to_path_buf(),
                    });
                };
                let evaluated = bootstrap
                    .evaluate(root, path, env, overrides)
                    .await
                    .map_err(|e| ConfigError::load_failed(path, e.message, env.mode))?;
                (evaluated.value, evaluated.plugins)
            }
        };

        let layer = UserConfig::from_value(value)
            .map_err(|e| ConfigError::load_failed(path, e.message, env.mode))?;

        info!(
            file = %path.display(),
            plugins = plugins.len(),
            "Config file loaded"
        );
        Ok(LoadedConfigFile {
            path: path.to_path_buf(),
            layer,
            plugins,
        })
    }
}

async fn read_data(
    path: &Path,
    env: ConfigEnv,
    parse: fn(&str) -> Result<Value, String>,
) -> Result<Value, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::load_failed(path, e.to_string(), env.mode))?;
    parse(&text).map_err(|reason| ConfigError::load_failed(path, reason, env.mode))
}

fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_toml(text: &str) -> Result<Value, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}
