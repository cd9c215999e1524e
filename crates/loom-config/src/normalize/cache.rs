//! Persistent cache settings. Runs last: it reads the config file path,
//! runtime paths, namespace, mode, and defines.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use loom_core::config::compilation::{PersistentCacheOption, PersistentCacheOptions};
use loom_core::config::resolved::ResolvedPersistentCache;
use loom_core::config::{ResolvedConfig, UserConfig};

use super::absolutize;
use super::runtime::push_unique;

/// Cache directory, relative to the root.
pub const CACHE_DIR: &str = "node_modules/.loom/cache";

/// Lock files added to the build dependencies when present.
pub const LOCK_FILES: [&str; 4] = [
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
];

/// Resolves `compilation.persistentCache`.
///
/// Absent or `true` enables the defaults, `false` disables the cache, and
/// an object is layered over the defaults.
pub async fn normalize_persistent_cache(config: &mut ResolvedConfig, user: &UserConfig) {
    let option = user
        .compilation()
        .and_then(|c| c.persistent_cache.clone())
        .unwrap_or(PersistentCacheOption::Enabled(true));
    let options = match option {
        PersistentCacheOption::Enabled(false) => {
            config.compilation.persistent_cache = None;
            return;
        }
        PersistentCacheOption::Enabled(true) => PersistentCacheOptions::default(),
        PersistentCacheOption::Custom(options) => options,
    };

    let root = config.root.clone();
    let cache_dir = options
        .cache_dir
        .as_deref()
        .map(|dir| absolutize(&root, dir))
        .unwrap_or_else(|| root.join(CACHE_DIR));
    let namespace = options
        .namespace
        .unwrap_or_else(|| config.compilation.runtime.namespace.clone());

    let mut build_dependencies: Vec<PathBuf> = Vec::new();
    let user_dependencies = options.build_dependencies.unwrap_or_default();
    for dependency in user_dependencies {
        push_unique(&mut build_dependencies, absolutize(&root, &dependency));
    }
    if let Some(config_file) = &config.config_file_path {
        push_unique(&mut build_dependencies, config_file.clone());
    }
    push_unique(&mut build_dependencies, root.join("package.json"));
    for lock_file in LOCK_FILES {
        let path = root.join(lock_file);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            push_unique(&mut build_dependencies, path);
        }
    }
    let runtime_entry = &config.compilation.runtime.path;
    if !runtime_entry.as_os_str().is_empty() {
        push_unique(&mut build_dependencies, runtime_entry.clone());
    }
    for plugin in &config.compilation.runtime.plugins {
        push_unique(&mut build_dependencies, plugin.clone());
    }

    let mut envs = BTreeMap::from([("mode".to_string(), config.mode.as_str().to_string())]);
    for (key, value) in &config.compilation.define {
        envs.insert(key.clone(), env_value(value));
    }
    envs.extend(options.envs.unwrap_or_default());

    config.compilation.persistent_cache = Some(ResolvedPersistentCache {
        cache_dir,
        namespace,
        build_dependencies,
        envs,
    });
}

fn env_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::config::compilation::UserCompilationConfig;
    use loom_core::types::{Command, Mode};
    use serde_json::json;

    fn user(option: PersistentCacheOption) -> UserConfig {
        UserConfig {
            compilation: Some(UserCompilationConfig {
                persistent_cache: Some(option),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("pnpm-lock.yaml"), "")
            .await
            .expect("write");
        let mut config = ResolvedConfig::new(dir.path(), Mode::Production, Command::Build);
        config.config_file_path = Some(dir.path().join("loom.config.ts"));
        config.compilation.runtime.namespace = "ns".to_string();
        config.compilation.runtime.path = dir.path().join("runtime/index.ts");
        config
            .compilation
            .define
            .insert("process.env.NODE_ENV".to_string(), json!("production"));
        config
            .compilation
            .define
            .insert("__DEBUG__".to_string(), json!(false));

        normalize_persistent_cache(&mut config, &UserConfig::default()).await;

        let cache = config.compilation.persistent_cache.expect("enabled");
        assert_eq!(cache.cache_dir, dir.path().join(CACHE_DIR));
        assert_eq!(cache.namespace, "ns");
        assert_eq!(
            cache.build_dependencies,
            vec![
                dir.path().join("loom.config.ts"),
                dir.path().join("package.json"),
                dir.path().join("pnpm-lock.yaml"),
                dir.path().join("runtime/index.ts"),
            ]
        );
        assert_eq!(cache.envs["mode"], "production");
        assert_eq!(cache.envs["process.env.NODE_ENV"], "production");
        assert_eq!(cache.envs["__DEBUG__"], "false");
    }

    #[tokio::test]
    async fn test_disabled() {
        let mut config = ResolvedConfig::new("/app", Mode::Production, Command::Build);
        normalize_persistent_cache(&mut config, &user(PersistentCacheOption::Enabled(false)))
            .await;
        assert!(config.compilation.persistent_cache.is_none());
    }

    #[tokio::test]
    async fn test_custom_options_layer_over_defaults() {
        let options = PersistentCacheOptions {
            cache_dir: Some(PathBuf::from(".cache")),
            envs: Some(BTreeMap::from([("mode".to_string(), "custom".to_string())])),
            build_dependencies: Some(vec![PathBuf::from("tsconfig.json")]),
            ..Default::default()
        };
        let mut config = ResolvedConfig::new("/app", Mode::Development, Command::Serve);
        config.compilation.runtime.namespace = "runtime-ns".to_string();

        normalize_persistent_cache(&mut config, &user(PersistentCacheOption::Custom(options)))
            .await;

        let cache = config.compilation.persistent_cache.expect("enabled");
        assert_eq!(cache.cache_dir, PathBuf::from("/app/.cache"));
        assert_eq!(cache.namespace, "runtime-ns");
        assert_eq!(cache.envs["mode"], "custom");
        assert_eq!(cache.build_dependencies[0], PathBuf::from("/app/tsconfig.json"));
    }
}
