//! Stage-0: compiling a script config file before anything else exists.
//!
//! The config file is compiled through the same [`ModuleCompiler`] as the
//! project, but with a fixed configuration that no user setting or plugin
//! can influence. Its compiled output is evaluated once and then removed.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use loom_core::config::ResolvedConfig;
use loom_core::config::env::EnvOverrides;
use loom_core::traits::{ConfigExport, ModuleCompiler};
use loom_core::types::{Command, ConfigEnv, TargetEnv};
use loom_core::{LoomError, LoomResult};
use loom_plugin::PluginEntry;

/// Node built-in modules, never bundled into a node-targeted output.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Matches any specifier that is neither relative nor absolute.
pub const BARE_IMPORT_PATTERN: &str = r"^[^./\\]";

/// Directory compiled config bundles are written to, relative to the root.
pub const CONFIG_OUTPUT_DIR: &str = "node_modules/.loom/config";

/// External pattern matching node built-ins, with or without `node:`.
pub fn node_builtins_pattern() -> String {
    format!("^(node:)?({})(/.*)?$", NODE_BUILTINS.join("|"))
}

/// A config module after evaluation.
#[derive(Debug)]
pub struct ConfigModule {
    /// The default export.
    pub export: ConfigExport,
    /// Plugins declared by the config file.
    pub plugins: Vec<PluginEntry>,
}

/// Runs a compiled config bundle and returns its exports.
#[async_trait]
pub trait ConfigModuleEvaluator: Send + Sync {
    /// Evaluates the compiled module at `path`.
    async fn evaluate(&self, path: &Path) -> LoomResult<ConfigModule>;
}

/// Builds the fixed stage-0 configuration for `config_file`.
pub fn stage0_config(
    root: &Path,
    config_file: &Path,
    env: ConfigEnv,
    overrides: &EnvOverrides,
) -> ResolvedConfig {
    let mut config = ResolvedConfig::new(root, env.mode, Command::Build);
    config.config_file_path = Some(config_file.to_path_buf());

    let compilation = &mut config.compilation;
    compilation.input = BTreeMap::from([(
        "config".to_string(),
        config_file.to_string_lossy().to_string(),
    )]);

    let format = overrides.config_format.unwrap_or_default();
    compilation.output.path = root.join(CONFIG_OUTPUT_DIR);
    compilation.output.public_path = "./".to_string();
    compilation.output.target_env = TargetEnv::Node;
    compilation.output.format = format;
    compilation.output.filename = "[resourceName].[ext]".to_string();
    compilation.output.entry_filename = format!(
        "config-{}.{}",
        Utc::now().timestamp_millis(),
        format.extension()
    );

    compilation.external = vec![node_builtins_pattern()];
    if !overrides.full_bundle() {
        compilation.external.push(BARE_IMPORT_PATTERN.to_string());
    }

    compilation.resolve.extensions = ["ts", "mts", "cts", "js", "mjs", "cjs", "json"]
        .iter()
        .map(|ext| ext.to_string())
        .collect();
    compilation.resolve.main_fields = ["exports", "module", "main"]
        .iter()
        .map(|field| field.to_string())
        .collect();
    compilation.resolve.symlinks = true;

    compilation.persistent_cache = None;
    compilation.tree_shaking = false;
    compilation.lazy_compilation = false;
    compilation.minify = false;
    compilation.preset_env = false;
    compilation.sourcemap = false;
    compilation.profile = false;

    config
}

/// A config object produced by a script config file.
#[derive(Debug)]
pub struct EvaluatedConfig {
    /// The config object, after calling a factory export.
    pub value: Value,
    /// Plugins declared by the config file.
    pub plugins: Vec<PluginEntry>,
}

/// Compiles and evaluates script config files.
#[derive(Clone)]
pub struct ConfigBootstrap {
    compiler: Arc<dyn ModuleCompiler>,
    evaluator: Arc<dyn ConfigModuleEvaluator>,
}

impl ConfigBootstrap {
    /// Creates a bootstrap over a compiler and a module evaluator.
    pub fn new(
        compiler: Arc<dyn ModuleCompiler>,
        evaluator: Arc<dyn ConfigModuleEvaluator>,
    ) -> Self {
        Self {
            compiler,
            evaluator,
        }
    }

    /// Compiles `config_file`, evaluates the result, and removes the
    /// compiled bundle.
    pub async fn evaluate(
        &self,
        root: &Path,
        config_file: &Path,
        env: ConfigEnv,
        overrides: &EnvOverrides,
    ) -> LoomResult<EvaluatedConfig> {
        let stage0 = stage0_config(root, config_file, env, overrides);
        info!(file = %config_file.display(), "Compiling config file");

        let outputs = self.compiler.compile(&stage0).await?;
        let output = outputs.into_iter().next().ok_or_else(|| {
            LoomError::compiler(format!(
                "Compiling {} produced no output",
                config_file.display()
            ))
        })?;
        debug!(output = %output.display(), "Evaluating compiled config");

        let evaluated = self.evaluator.evaluate(&output).await;
        remove_compiled(&output).await;

        let module = evaluated?;
        let value = module.export.into_value(env).await?;
        Ok(EvaluatedConfig {
            value,
            plugins: module.plugins,
        })
    }
}

impl std::fmt::Debug for ConfigBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBootstrap").finish_non_exhaustive()
    }
}

async fn remove_compiled(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(
            file = %path.display(),
            error = %e,
            "Failed to remove compiled config file"
        );
    }
}
