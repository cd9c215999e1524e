//! User-facing compilation settings.
//!
//! Every field is optional: a `UserCompilationConfig` is one layer of the
//! merge (defaults, config file, inline options, or a `config` hook
//! contribution), not the final answer.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ModuleFormat, TargetEnv};

/// Compilation settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCompilationConfig {
    /// Entry name → entry path.
    pub input: Option<BTreeMap<String, String>>,
    /// Output settings.
    pub output: Option<UserOutputConfig>,
    /// Module resolution settings.
    pub resolve: Option<UserResolveConfig>,
    /// Regex patterns of specifiers left out of the bundle.
    pub external: Option<Vec<String>>,
    /// Compile-time replacements.
    pub define: Option<BTreeMap<String, Value>>,
    /// Runtime bootstrap settings.
    pub runtime: Option<UserRuntimeConfig>,
    /// Whether to emit source maps.
    pub sourcemap: Option<bool>,
    /// Whether to minify output.
    pub minify: Option<bool>,
    /// Whether to apply preset-env downleveling and polyfills.
    pub preset_env: Option<bool>,
    /// Whether to tree-shake.
    pub tree_shaking: Option<bool>,
    /// Whether to defer compiling dynamic imports until requested.
    pub lazy_compilation: Option<bool>,
    /// Persistent cache switch or settings.
    pub persistent_cache: Option<PersistentCacheOption>,
    /// Whether the compiler records profiling data.
    pub profile: Option<bool>,
}

/// Output settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOutputConfig {
    /// Output directory (relative to root unless absolute).
    pub path: Option<PathBuf>,
    /// Public path prefix for emitted resources.
    pub public_path: Option<String>,
    /// Target environment.
    pub target_env: Option<TargetEnv>,
    /// Module format.
    pub format: Option<ModuleFormat>,
    /// Filename pattern for non-entry resources.
    pub filename: Option<String>,
    /// Filename pattern for entry resources.
    pub entry_filename: Option<String>,
}

/// Module resolution settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResolveConfig {
    /// Specifier prefix → replacement.
    pub alias: Option<BTreeMap<String, String>>,
    /// Extensions tried for extensionless specifiers.
    pub extensions: Option<Vec<String>>,
    /// `package.json` fields consulted for a package entry.
    pub main_fields: Option<Vec<String>>,
    /// Export conditions.
    pub conditions: Option<Vec<String>>,
    /// Whether symlinks resolve to their real path.
    pub symlinks: Option<bool>,
}

/// Runtime bootstrap settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRuntimeConfig {
    /// Directory of the runtime package.
    pub dir: Option<PathBuf>,
    /// Core runtime entry.
    pub path: Option<PathBuf>,
    /// Runtime plugins.
    pub plugins: Option<Vec<PathBuf>>,
    /// Namespace isolating this project's runtime.
    pub namespace: Option<String>,
    /// Whether the runtime is emitted as a separate resource.
    pub isolate: Option<bool>,
}

/// `persistentCache: true | false | { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistentCacheOption {
    /// Switch with default settings.
    Enabled(bool),
    /// Explicit settings (enabled).
    Custom(PersistentCacheOptions),
}

/// Explicit persistent cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentCacheOptions {
    /// Cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Cache namespace.
    pub namespace: Option<String>,
    /// Extra files whose change invalidates the cache.
    pub build_dependencies: Option<Vec<PathBuf>>,
    /// Extra key/value pairs folded into the cache key.
    pub envs: Option<BTreeMap<String, String>>,
}
