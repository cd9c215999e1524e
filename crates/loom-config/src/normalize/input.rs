//! Entry discovery.

use tracing::error;

use loom_core::LoomResult;
use loom_core::config::ResolvedConfig;
use loom_core::types::{Command, TargetEnv};

use crate::error::ConfigError;

/// Entry candidates tried when no input is configured.
pub fn entry_candidates(target: TargetEnv) -> &'static [&'static str] {
    match target {
        TargetEnv::Browser => &["index.html"],
        TargetEnv::Node => &["index.js", "index.ts"],
    }
}

/// Fills in `compilation.input` when it is empty.
///
/// The first candidate present in the root becomes the `index` entry.
/// Preview serves an existing build and needs no entry.
pub async fn resolve_input(config: &mut ResolvedConfig) -> LoomResult<()> {
    if !config.compilation.input.is_empty() || config.command == Command::Preview {
        return Ok(());
    }

    let candidates = entry_candidates(config.compilation.output.target_env);
    for candidate in candidates {
        let exists = tokio::fs::try_exists(config.root.join(candidate))
            .await
            .unwrap_or(false);
        if exists {
            config
                .compilation
                .input
                .insert("index".to_string(), format!("./{candidate}"));
            return Ok(());
        }
    }

    let candidates: Vec<String> = candidates.iter().map(|c| c.to_string()).collect();
    error!(
        root = %config.root.display(),
        candidates = ?candidates,
        "No entry configured and none found"
    );
    Err(ConfigError::NoEntry {
        root: config.root.clone(),
        candidates,
    }
    .into())
}
