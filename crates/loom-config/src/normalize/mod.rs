//! Normalization of the merged user config into a [`ResolvedConfig`].
//!
//! [`seed`] copies every directly-configured value; [`normalize`] then runs
//! the derivation steps in a fixed order. Later steps read fields written
//! by earlier ones, and the persistent cache step must stay last.

pub mod cache;
pub mod define;
pub mod hmr;
pub mod input;
pub mod optimize;
pub mod output;
pub mod runtime;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use loom_core::LoomResult;
use loom_core::config::env::EnvOverrides;
use loom_core::config::server::HttpsOption;
use loom_core::config::{DEFAULT_PREVIEW_PORT, ResolvedConfig, UserConfig};
use loom_core::types::{Command, Mode};

/// Inputs shared by the normalization steps.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// The merged user config, after every `config` hook.
    pub user: &'a UserConfig,
    /// `LOOM_*` overrides.
    pub overrides: &'a EnvOverrides,
}

/// Normalization steps, in the order [`normalize`] runs them.
pub const STEPS: [&str; 11] = [
    "input",
    "output",
    "public-dir",
    "define",
    "runtime",
    "namespace",
    "lazy-compilation",
    "hmr",
    "optimizations",
    "mutual-exclusion",
    "persistent-cache",
];

/// Resolves `path` against `root` unless it is already absolute.
pub(crate) fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Builds the resolved config from directly-configured values.
///
/// `env_source` is filtered by the configured env prefixes.
pub fn seed(
    user: &UserConfig,
    root: PathBuf,
    mode: Mode,
    command: Command,
    config_file: Option<PathBuf>,
    env_source: &BTreeMap<String, String>,
    overrides: &EnvOverrides,
) -> ResolvedConfig {
    let mut config = ResolvedConfig::new(root, mode, command);
    config.config_file_path = config_file;

    config.env_dir = user
        .env_dir
        .as_deref()
        .map(|dir| absolutize(&config.root, dir))
        .unwrap_or_else(|| config.root.clone());
    config.env_prefix = user.env_prefix.clone().unwrap_or_default();
    config.env = env_source
        .iter()
        .filter(|(key, _)| config.env_prefix.iter().any(|prefix| key.starts_with(prefix)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if let Some(user) = user.compilation() {
        let compilation = &mut config.compilation;
        compilation.input = user.input.clone().unwrap_or_default();
        compilation.external = user.external.clone().unwrap_or_default();
        compilation.define = user.define.clone().unwrap_or_default();
        compilation.sourcemap = user.sourcemap.unwrap_or(true);
        compilation.profile = user.profile.or(overrides.profile).unwrap_or(false);

        if let Some(output) = &user.output {
            let resolved = &mut compilation.output;
            resolved.path = output.path.clone().unwrap_or_default();
            resolved.public_path = output.public_path.clone().unwrap_or_default();
            resolved.target_env = output.target_env.unwrap_or_default();
            resolved.format = output.format.unwrap_or_default();
            resolved.filename = output.filename.clone().unwrap_or_default();
            resolved.entry_filename = output.entry_filename.clone().unwrap_or_default();
        }

        if let Some(resolve) = &user.resolve {
            let resolved = &mut compilation.resolve;
            resolved.alias = resolve.alias.clone().unwrap_or_default();
            resolved.extensions = resolve.extensions.clone().unwrap_or_default();
            resolved.main_fields = resolve.main_fields.clone().unwrap_or_default();
            resolved.conditions = resolve.conditions.clone().unwrap_or_default();
            resolved.symlinks = resolve.symlinks.unwrap_or(true);
        }
    }

    if let Some(server) = user.server() {
        let resolved = &mut config.server;
        resolved.port = server.port.unwrap_or_else(|| overrides.server_port());
        resolved.host = server.host.clone().unwrap_or_else(|| "localhost".to_string());
        resolved.https = server.https.clone().filter(HttpsOption::is_enabled);
        resolved.strict_port = server.strict_port.unwrap_or(false);
        resolved.open = server.open.unwrap_or(false);
        resolved.cors = server.cors.unwrap_or(false);
        resolved.proxy = server.proxy.clone().unwrap_or_default();
    } else {
        config.server.port = overrides.server_port();
        config.server.host = "localhost".to_string();
    }

    let preview = user.preview.clone().unwrap_or_default();
    config.preview.port = preview.port.unwrap_or(DEFAULT_PREVIEW_PORT);
    config.preview.host = preview.host.unwrap_or_else(|| "localhost".to_string());
    config.preview.open = preview.open.unwrap_or(false);
    config.preview.strict_port = preview.strict_port.unwrap_or(false);
    config.preview.dist_dir = preview.dist_dir.unwrap_or_default();

    config
}

/// Runs every normalization step in order.
pub async fn normalize(config: &mut ResolvedConfig, ctx: NormalizeContext<'_>) -> LoomResult<()> {
    input::resolve_input(config).await?;
    output::normalize_output(config)?;
    output::normalize_public_dir(config, ctx.user);
    define::normalize_define(config);
    runtime::normalize_runtime(config, ctx.user);
    runtime::normalize_namespace(config, ctx.user).await;
    optimize::decide_lazy_compilation(config, ctx.user);
    hmr::normalize_hmr(config, ctx.user, ctx.overrides);
    optimize::decide_optimizations(config, ctx.user);
    optimize::enforce_mutual_exclusion(config);
    cache::normalize_persistent_cache(config, ctx.user).await;

    debug!(steps = STEPS.len(), "Config normalized");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Defaults merged with `overlay`, as the resolver would produce.
    pub fn merged(overlay: serde_json::Value) -> UserConfig {
        let defaults = UserConfig::defaults(&EnvOverrides::default())
            .to_value()
            .expect("defaults");
        let merged = loom_core::merge::merge_layers([defaults, overlay]);
        UserConfig::from_value(merged).expect("merged")
    }

    /// Seeds a resolved config rooted at `root`.
    pub fn seeded(user: &UserConfig, root: &Path, mode: Mode, command: Command) -> ResolvedConfig {
        seed(
            user,
            root.to_path_buf(),
            mode,
            command,
            None,
            &BTreeMap::new(),
            &EnvOverrides::default(),
        )
    }
}
