//! Configuration schemas.
//!
//! [`UserConfig`] is the all-optional shape shared by every config layer;
//! [`ResolvedConfig`] is the concrete result of resolution. Both serialize
//! to camelCase JSON trees, which is how layers are merged.

pub mod compilation;
pub mod env;
pub mod logging;
pub mod resolved;
pub mod server;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use self::compilation::{UserCompilationConfig, UserOutputConfig, UserResolveConfig};
use self::env::EnvOverrides;
use self::server::{HmrOption, UserPreviewConfig, UserServerConfig};
use crate::error::LoomError;
use crate::types::{Command, Mode, ModuleFormat, TargetEnv};

pub use self::env::DEFAULT_SERVER_PORT;
pub use self::logging::LoggingConfig;
pub use self::resolved::ResolvedConfig;

/// Default preview-server port.
pub const DEFAULT_PREVIEW_PORT: u16 = 1911;

/// Where a config layer came from. Only used to order the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigSource {
    /// Built-in defaults.
    Default,
    /// The on-disk config file.
    File,
    /// Inline (command-line) options.
    Cli,
}

/// One layer of user configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    /// Project root.
    pub root: Option<PathBuf>,
    /// Compilation mode.
    pub mode: Option<Mode>,
    /// Public directory.
    pub public_dir: Option<PathBuf>,
    /// Directory env files are read from.
    pub env_dir: Option<PathBuf>,
    /// Prefixes of env variables exposed to the client.
    pub env_prefix: Option<Vec<String>>,
    /// Compilation settings.
    pub compilation: Option<UserCompilationConfig>,
    /// Dev-server settings.
    pub server: Option<UserServerConfig>,
    /// Preview-server settings.
    pub preview: Option<UserPreviewConfig>,
}

impl UserConfig {
    /// The built-in defaults layer.
    ///
    /// Mode-dependent settings (tree shaking, minify, lazy compilation, ...)
    /// are left unset here and decided during normalization.
    pub fn defaults(overrides: &EnvOverrides) -> Self {
        Self {
            root: None,
            mode: None,
            public_dir: None,
            env_dir: None,
            env_prefix: Some(vec!["LOOM_".to_string(), "VITE_".to_string()]),
            compilation: Some(UserCompilationConfig {
                input: None,
                output: Some(UserOutputConfig {
                    path: Some(PathBuf::from("dist")),
                    public_path: None,
                    target_env: Some(TargetEnv::Browser),
                    format: Some(ModuleFormat::Esm),
                    filename: None,
                    entry_filename: None,
                }),
                resolve: Some(UserResolveConfig {
                    alias: Some(BTreeMap::new()),
                    extensions: Some(
                        ["tsx", "ts", "jsx", "js", "mjs", "json", "html", "css"]
                            .iter()
                            .map(|ext| ext.to_string())
                            .collect(),
                    ),
                    main_fields: Some(
                        ["exports", "browser", "module", "main"]
                            .iter()
                            .map(|field| field.to_string())
                            .collect(),
                    ),
                    conditions: Some(Vec::new()),
                    symlinks: Some(true),
                }),
                external: Some(Vec::new()),
                define: Some(BTreeMap::new()),
                runtime: None,
                sourcemap: Some(true),
                minify: None,
                preset_env: None,
                tree_shaking: None,
                lazy_compilation: None,
                persistent_cache: None,
                profile: overrides.profile,
            }),
            server: Some(UserServerConfig {
                port: Some(overrides.server_port()),
                host: Some("localhost".to_string()),
                https: None,
                hmr: Some(HmrOption::Enabled(true)),
                strict_port: Some(false),
                open: Some(false),
                cors: Some(false),
                proxy: Some(BTreeMap::new()),
            }),
            preview: Some(UserPreviewConfig {
                port: Some(DEFAULT_PREVIEW_PORT),
                host: Some("localhost".to_string()),
                open: Some(false),
                strict_port: Some(false),
                dist_dir: None,
            }),
        }
    }

    /// Serializes this layer for merging.
    pub fn to_value(&self) -> Result<Value, LoomError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserializes a merged tree back into a typed layer.
    pub fn from_value(value: Value) -> Result<Self, LoomError> {
        serde_json::from_value(value)
            .map_err(|e| LoomError::configuration(format!("Invalid configuration: {e}")))
    }

    /// Returns the compilation section, if present.
    pub fn compilation(&self) -> Option<&UserCompilationConfig> {
        self.compilation.as_ref()
    }

    /// Returns the dev-server section, if present.
    pub fn server(&self) -> Option<&UserServerConfig> {
        self.server.as_ref()
    }
}

/// Returns the mode a command runs in when nothing else decides it.
pub fn resolve_mode(layers: &[Option<Mode>], command: Command) -> Mode {
    layers
        .iter()
        .rev()
        .find_map(|mode| *mode)
        .unwrap_or_else(|| command.default_mode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_env_port() {
        let overrides = EnvOverrides {
            default_server_port: Some(4321),
            ..Default::default()
        };
        let defaults = UserConfig::defaults(&overrides);
        assert_eq!(defaults.server().and_then(|s| s.port), Some(4321));
    }

    #[test]
    fn test_value_roundtrip_keeps_camel_case() {
        let defaults = UserConfig::defaults(&EnvOverrides::default());
        let value = defaults.to_value().expect("to value");
        assert_eq!(
            value["compilation"]["output"]["targetEnv"],
            serde_json::json!("browser")
        );
        assert_eq!(value["server"]["strictPort"], serde_json::json!(false));
        let back = UserConfig::from_value(value).expect("from value");
        assert_eq!(back, defaults);
    }

    #[test]
    fn test_resolve_mode_precedence() {
        assert_eq!(
            resolve_mode(&[Some(Mode::Development), Some(Mode::Production)], Command::Serve),
            Mode::Production
        );
        assert_eq!(
            resolve_mode(&[Some(Mode::Development), None], Command::Build),
            Mode::Development
        );
        assert_eq!(resolve_mode(&[None, None], Command::Build), Mode::Production);
    }

    #[test]
    fn test_source_ordering() {
        assert!(ConfigSource::Default < ConfigSource::File);
        assert!(ConfigSource::File < ConfigSource::Cli);
    }
}
