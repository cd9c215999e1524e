//! Runtime bootstrap paths and namespace.

use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use loom_core::config::compilation::UserRuntimeConfig;
use loom_core::config::{ResolvedConfig, UserConfig};

use super::absolutize;

/// Runtime package directory, relative to the root.
pub const RUNTIME_DIR: &str = "node_modules/@loom/runtime";
/// Core runtime entry, relative to the runtime directory.
pub const RUNTIME_ENTRY: &str = "src/index.ts";
/// HMR client plugin, relative to the runtime directory.
pub const HMR_PLUGIN: &str = "src/plugins/hmr.ts";
/// `import.meta` plugin, relative to the runtime directory.
pub const IMPORT_META_PLUGIN: &str = "src/plugins/import-meta.ts";
/// Hashed when `package.json` has no name.
pub const DEFAULT_NAMESPACE_SEED: &str = "loom-default-namespace";

/// Absolute runtime package directory.
pub fn runtime_dir(root: &Path, user: &UserConfig) -> PathBuf {
    runtime_options(user)
        .dir
        .as_deref()
        .map(|dir| absolutize(root, dir))
        .unwrap_or_else(|| root.join(RUNTIME_DIR))
}

fn runtime_options(user: &UserConfig) -> UserRuntimeConfig {
    user.compilation()
        .and_then(|c| c.runtime.clone())
        .unwrap_or_default()
}

/// Resolves the runtime entry and plugins to absolute paths.
///
/// User plugins come first, then the import-meta plugin. Duplicates are
/// dropped, keeping the first occurrence.
pub fn normalize_runtime(config: &mut ResolvedConfig, user: &UserConfig) {
    let options = runtime_options(user);
    let dir = runtime_dir(&config.root, user);

    config.compilation.runtime.path = options
        .path
        .as_deref()
        .map(|path| absolutize(&config.root, path))
        .unwrap_or_else(|| dir.join(RUNTIME_ENTRY));

    let plugins = options
        .plugins
        .unwrap_or_default()
        .into_iter()
        .map(|plugin| absolutize(&config.root, &plugin))
        .chain(std::iter::once(dir.join(IMPORT_META_PLUGIN)));
    config.compilation.runtime.plugins = Vec::new();
    for plugin in plugins {
        push_unique(&mut config.compilation.runtime.plugins, plugin);
    }

    config.compilation.runtime.isolate = options.isolate.unwrap_or(false);
}

/// Appends `path` unless already present.
pub(crate) fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Sets the runtime namespace: the user's, or a SHA-256 of the package name.
pub async fn normalize_namespace(config: &mut ResolvedConfig, user: &UserConfig) {
    if let Some(namespace) = runtime_options(user).namespace {
        config.compilation.runtime.namespace = namespace;
        return;
    }

    let name = package_name(&config.root).await;
    debug!(package = ?name, "Deriving runtime namespace");
    config.compilation.runtime.namespace =
        namespace_hash(name.as_deref().unwrap_or(DEFAULT_NAMESPACE_SEED));
}

async fn package_name(root: &Path) -> Option<String> {
    let text = tokio::fs::read_to_string(root.join("package.json"))
        .await
        .ok()?;
    let manifest: Value = serde_json::from_str(&text).ok()?;
    manifest
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Hex SHA-256 of `seed`.
pub fn namespace_hash(seed: &str) -> String {
    Sha256::digest(seed.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
