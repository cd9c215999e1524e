//! Shared test helpers for integration tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use loom_config::{ConfigResolver, InlineConfig, ResolvedConfigSession};
use loom_core::LoomResult;
use loom_core::config::env::EnvOverrides;
use loom_core::traits::CompilerContext;
use loom_core::types::{Command, ConfigEnv, ResolveParam, ResolveResult};
use loom_plugin::prelude::*;
use loom_plugin::testing::MockCompiler;

/// A project directory with the given files.
pub async fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .expect("Failed to create fixture dir");
        }
        tokio::fs::write(&path, content)
            .await
            .expect("Failed to write fixture");
    }
    dir
}

/// A browser project with an HTML entry.
pub async fn html_project() -> TempDir {
    project(&[("index.html", "<html><body></body></html>")]).await
}

/// Inline options rooted at `root` with an empty environment.
pub fn inline(root: &Path) -> InlineConfig {
    InlineConfig {
        root: Some(root.to_path_buf()),
        env: Some(BTreeMap::new()),
        ..Default::default()
    }
}

/// Resolves a session for `command` with `plugins`.
pub async fn session(
    root: &Path,
    command: Command,
    plugins: Vec<PluginEntry>,
) -> ResolvedConfigSession {
    ConfigResolver::new(command, EnvOverrides::default())
        .with_plugins(plugins)
        .resolve(&inline(root))
        .await
        .expect("Failed to resolve config")
}

/// A compiler context over a mock rooted at `root`.
pub fn compiler(root: &Path) -> (MockCompiler, Arc<dyn CompilerContext>) {
    let mock = MockCompiler::new(root);
    let ctx = mock.context();
    (mock, ctx)
}

/// Native plugin resolving every source with a suffix to a fixed path.
#[derive(Debug)]
pub struct SuffixResolver {
    pub name: &'static str,
    pub enforce: Option<Enforce>,
    pub suffix: &'static str,
    pub target: &'static str,
}

#[async_trait]
impl Plugin for SuffixResolver {
    fn name(&self) -> &str {
        self.name
    }

    fn priority(&self) -> i32 {
        priority_of(self.enforce)
    }

    async fn resolve(
        &self,
        param: &ResolveParam,
        _ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<ResolveResult>> {
        if !param.source.ends_with(self.suffix) {
            return Ok(None);
        }
        Ok(Some(ResolveResult {
            resolved_path: self.target.to_string(),
            external: false,
            ..Default::default()
        }))
    }
}

/// Ecosystem plugin recording what it observed.
#[derive(Debug, Default)]
pub struct RecordingEcosystemPlugin {
    pub name: &'static str,
    pub contribution: Option<Value>,
    pub resolved_views: Mutex<Vec<Value>>,
    pub hot_updates: Mutex<Vec<String>>,
}

#[async_trait]
impl EcosystemPlugin for RecordingEcosystemPlugin {
    fn name(&self) -> &str {
        self.name
    }

    async fn config(&self, _config: &Value, _env: &ConfigEnv) -> LoomResult<Option<Value>> {
        Ok(self.contribution.clone())
    }

    async fn config_resolved(&self, config: &Value) -> LoomResult<()> {
        self.resolved_views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(config.clone());
        Ok(())
    }

    async fn handle_hot_update(&self, ctx: &HotUpdateContext) -> LoomResult<Option<Vec<String>>> {
        self.hot_updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ctx.file.clone());
        Ok(None)
    }
}
