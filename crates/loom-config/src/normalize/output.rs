//! Output path, public path, filenames, externals, and the public dir.

use std::path::PathBuf;

use regex::Regex;

use loom_core::LoomResult;
use loom_core::config::{ResolvedConfig, UserConfig};
use loom_core::types::TargetEnv;

use super::absolutize;
use crate::bootstrap::node_builtins_pattern;

/// Normalizes `compilation.output` and `compilation.external`.
pub fn normalize_output(config: &mut ResolvedConfig) -> LoomResult<()> {
    let root = config.root.clone();
    let production = config.mode.is_production();
    let output = &mut config.compilation.output;

    if output.path.as_os_str().is_empty() {
        output.path = PathBuf::from("dist");
    }
    output.path = absolutize(&root, &output.path);

    output.public_path = normalize_public_path(&output.public_path, output.target_env);

    if output.filename.is_empty() {
        output.filename = if production {
            "[resourceName].[contentHash].[ext]".to_string()
        } else {
            "[resourceName].[ext]".to_string()
        };
    }
    if output.entry_filename.is_empty() {
        let ext = match output.target_env {
            TargetEnv::Browser => "js",
            TargetEnv::Node => output.format.extension(),
        };
        output.entry_filename = if production {
            format!("[entryName].[contentHash].{ext}")
        } else {
            format!("[entryName].{ext}")
        };
    }

    if config.preview.dist_dir.as_os_str().is_empty() {
        config.preview.dist_dir = config.compilation.output.path.clone();
    } else {
        config.preview.dist_dir = absolutize(&root, &config.preview.dist_dir);
    }

    normalize_external(config)
}

/// Applies the public-path rules.
///
/// Empty becomes `/` for browsers and `./` for node. A trailing slash is
/// always added. A leading slash is added unless the path is relative or an
/// absolute URL.
pub fn normalize_public_path(public_path: &str, target: TargetEnv) -> String {
    if public_path.is_empty() {
        return match target {
            TargetEnv::Browser => "/".to_string(),
            TargetEnv::Node => "./".to_string(),
        };
    }

    let mut normalized = public_path.to_string();
    let relative = normalized.starts_with("./") || normalized.starts_with("../");
    let url = normalized.contains("://") || normalized.starts_with("//");
    if !relative && !url && !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn normalize_external(config: &mut ResolvedConfig) -> LoomResult<()> {
    let external = &mut config.compilation.external;
    for pattern in external.iter() {
        Regex::new(pattern)?;
    }

    if config.compilation.output.target_env.is_node() {
        let builtins = node_builtins_pattern();
        if !external.contains(&builtins) {
            external.push(builtins);
        }
    }
    Ok(())
}

/// Defaults `publicDir` to `<root>/public`; relative paths resolve against
/// the root.
pub fn normalize_public_dir(config: &mut ResolvedConfig, user: &UserConfig) {
    let dir = user
        .public_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("public"));
    config.public_dir = absolutize(&config.root, &dir);
}
