//! The fully resolved configuration.
//!
//! A [`ResolvedConfig`] is built once per session by the config resolver,
//! mutated in place by its normalization steps, and then shared read-only
//! (behind an `Arc`) with plugins and the compiler. Its serialized shape
//! uses the same camelCase paths as [`UserConfig`](super::UserConfig) so the
//! ecosystem config mapping works on either.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::server::HttpsOption;
use crate::types::{Command, ConfigEnv, Mode, ModuleFormat, TargetEnv};

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// Absolute project root.
    pub root: PathBuf,
    /// Resolved mode.
    pub mode: Mode,
    /// Command being run.
    pub command: Command,
    /// Config file the settings were loaded from, if any.
    pub config_file_path: Option<PathBuf>,
    /// Absolute public directory copied verbatim to the output.
    pub public_dir: PathBuf,
    /// Directory env files are read from.
    pub env_dir: PathBuf,
    /// Prefixes of env variables exposed to the client.
    pub env_prefix: Vec<String>,
    /// Exposed env variables.
    pub env: BTreeMap<String, String>,
    /// Compilation settings.
    pub compilation: ResolvedCompilation,
    /// Dev-server settings.
    pub server: ResolvedServerConfig,
    /// Preview-server settings.
    pub preview: ResolvedPreviewConfig,
}

impl ResolvedConfig {
    /// Creates an empty resolved config for a root, mode, and command.
    ///
    /// Every other field is left at its zero value for normalization to
    /// fill in.
    pub fn new(root: impl Into<PathBuf>, mode: Mode, command: Command) -> Self {
        Self {
            root: root.into(),
            mode,
            command,
            config_file_path: None,
            public_dir: PathBuf::new(),
            env_dir: PathBuf::new(),
            env_prefix: Vec::new(),
            env: BTreeMap::new(),
            compilation: ResolvedCompilation::default(),
            server: ResolvedServerConfig::default(),
            preview: ResolvedPreviewConfig::default(),
        }
    }

    /// Returns the environment handed to functional configs.
    pub fn config_env(&self) -> ConfigEnv {
        ConfigEnv {
            mode: self.mode,
            command: self.command,
        }
    }

    /// Returns whether any entry is an HTML file.
    pub fn has_html_input(&self) -> bool {
        self.compilation
            .input
            .values()
            .any(|entry| crate::types::query::strip_query(entry).ends_with(".html"))
    }
}

/// Resolved compilation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCompilation {
    /// Entry name → entry path.
    pub input: BTreeMap<String, String>,
    /// Output settings.
    pub output: ResolvedOutput,
    /// Module resolution settings.
    pub resolve: ResolvedResolve,
    /// Regex patterns of specifiers left out of the bundle.
    pub external: Vec<String>,
    /// Compile-time replacements.
    pub define: BTreeMap<String, Value>,
    /// Runtime bootstrap settings.
    pub runtime: ResolvedRuntime,
    /// Whether to emit source maps.
    pub sourcemap: bool,
    /// Whether to minify output.
    pub minify: bool,
    /// Whether to apply preset-env.
    pub preset_env: bool,
    /// Whether to tree-shake.
    pub tree_shaking: bool,
    /// Whether to compile dynamic imports lazily.
    pub lazy_compilation: bool,
    /// Persistent cache settings; `None` when disabled.
    pub persistent_cache: Option<ResolvedPersistentCache>,
    /// Whether the compiler records profiling data.
    pub profile: bool,
}

/// Resolved output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOutput {
    /// Absolute output directory.
    pub path: PathBuf,
    /// Public path prefix, always ending in `/`.
    pub public_path: String,
    /// Target environment.
    pub target_env: TargetEnv,
    /// Module format.
    pub format: ModuleFormat,
    /// Filename pattern for non-entry resources.
    pub filename: String,
    /// Filename pattern for entry resources.
    pub entry_filename: String,
}

/// Resolved module resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedResolve {
    /// Specifier prefix → replacement.
    pub alias: BTreeMap<String, String>,
    /// Extensions tried for extensionless specifiers.
    pub extensions: Vec<String>,
    /// `package.json` fields consulted for a package entry.
    pub main_fields: Vec<String>,
    /// Export conditions.
    pub conditions: Vec<String>,
    /// Whether symlinks resolve to their real path.
    pub symlinks: bool,
}

/// Resolved runtime bootstrap settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRuntime {
    /// Absolute core runtime entry.
    pub path: PathBuf,
    /// Absolute runtime plugin paths, deduplicated.
    pub plugins: Vec<PathBuf>,
    /// Namespace isolating this project's runtime.
    pub namespace: String,
    /// Whether the runtime is emitted as a separate resource.
    pub isolate: bool,
}

/// Resolved persistent cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPersistentCache {
    /// Absolute cache directory.
    pub cache_dir: PathBuf,
    /// Cache namespace.
    pub namespace: String,
    /// Files whose change invalidates the cache.
    pub build_dependencies: Vec<PathBuf>,
    /// Key/value pairs folded into the cache key.
    pub envs: BTreeMap<String, String>,
}

/// Resolved dev-server settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedServerConfig {
    /// Listening port.
    pub port: u16,
    /// Listening host.
    pub host: String,
    /// HTTPS settings; `None` when disabled.
    pub https: Option<HttpsOption>,
    /// HMR settings; `None` when disabled.
    pub hmr: Option<ResolvedHmr>,
    /// Fail instead of trying the next port when the port is taken.
    pub strict_port: bool,
    /// Open a browser on start.
    pub open: bool,
    /// Enable CORS.
    pub cors: bool,
    /// Path prefix → proxy options.
    pub proxy: BTreeMap<String, Value>,
}

/// Resolved HMR connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedHmr {
    /// HMR socket port.
    pub port: u16,
    /// HMR socket host.
    pub host: String,
    /// `ws` or `wss`.
    pub protocol: String,
    /// HMR socket path.
    pub path: String,
    /// Show the error overlay.
    pub overlay: bool,
}

/// Resolved preview-server settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPreviewConfig {
    /// Listening port.
    pub port: u16,
    /// Listening host.
    pub host: String,
    /// Open a browser on start.
    pub open: bool,
    /// Fail instead of trying the next port when the port is taken.
    pub strict_port: bool,
    /// Directory served.
    pub dist_dir: PathBuf,
}
