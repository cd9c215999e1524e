//! Config resolution: layers, `config` hooks, normalization.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use loom_core::config::env::EnvOverrides;
use loom_core::config::{ResolvedConfig, UserConfig, resolve_mode};
use loom_core::merge::merge_layers;
use loom_core::LoomResult;
use loom_core::types::{Command, ConfigEnv};
use loom_plugin::{HookDispatcher, PluginEntry, PluginRegistry};

use crate::bootstrap::ConfigBootstrap;
use crate::error::ConfigError;
use crate::inline::InlineConfig;
use crate::loader::{ConfigFileLoader, LoadedConfigFile, find_config_file};
use crate::normalize::{self, NormalizeContext, absolutize};

/// A resolved config and the dispatcher built alongside it.
///
/// Hooks must be driven through this dispatcher: its registry holds the
/// adapters that already saw this config.
#[derive(Debug, Clone)]
pub struct ResolvedConfigSession {
    /// The resolved config.
    pub config: Arc<ResolvedConfig>,
    /// Dispatcher over the session's plugins.
    pub dispatcher: HookDispatcher,
}

/// Resolves inline options and the config file into a [`ResolvedConfig`].
///
/// Layers merge as defaults < config file < inline options. The native
/// `config` hooks then run in plugin order, and the result is normalized.
#[derive(Debug)]
pub struct ConfigResolver {
    command: Command,
    overrides: EnvOverrides,
    loader: ConfigFileLoader,
    plugins: Vec<PluginEntry>,
}

impl ConfigResolver {
    /// Creates a resolver for `command`. Script config files are rejected
    /// until a bootstrap is attached.
    pub fn new(command: Command, overrides: EnvOverrides) -> Self {
        Self {
            command,
            overrides,
            loader: ConfigFileLoader::new(),
            plugins: Vec::new(),
        }
    }

    /// Enables script config files.
    pub fn with_bootstrap(mut self, bootstrap: ConfigBootstrap) -> Self {
        self.loader = ConfigFileLoader::with_bootstrap(bootstrap);
        self
    }

    /// Adds plugins registered after those of the config file.
    pub fn with_plugins(mut self, plugins: Vec<PluginEntry>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Resolves the config for `inline`.
    pub async fn resolve(&self, inline: &InlineConfig) -> LoomResult<ResolvedConfigSession> {
        let cwd = std::env::current_dir()?;
        let root = inline
            .root
            .as_deref()
            .map(|root| absolutize(&cwd, root))
            .unwrap_or(cwd);
        let env_source: BTreeMap<String, String> = match &inline.env {
            Some(env) => env.clone(),
            None => std::env::vars().collect(),
        };

        let initial_env = ConfigEnv {
            mode: resolve_mode(&[inline.mode], self.command),
            command: self.command,
        };
        let file = match find_config_file(&root, inline.config_path.as_deref()).await? {
            Some(path) => Some(self.load_file(&root, &path, initial_env).await?),
            None => None,
        };
        let (file_layer, mut entries, config_file) = match file {
            Some(LoadedConfigFile {
                path,
                layer,
                plugins,
            }) => (layer, plugins, Some(path)),
            None => (UserConfig::default(), Vec::new(), None),
        };
        entries.extend(self.plugins.iter().cloned());

        let mut cli_layer = inline.to_user_config();
        cli_layer.root = Some(root.clone());
        let mode = resolve_mode(&[file_layer.mode, cli_layer.mode], self.command);
        let env = ConfigEnv {
            mode,
            command: self.command,
        };

        let merged = UserConfig::from_value(merge_layers([
            UserConfig::defaults(&self.overrides).to_value()?,
            file_layer.to_value()?,
            cli_layer.to_value()?,
        ]))?;

        let registry = PluginRegistry::build(entries, &merged, env)?;
        let dispatcher = HookDispatcher::new(Arc::new(registry));
        let user = dispatcher.config(merged).await?;

        // Hooks may change the mode and the root.
        let mode = user.mode.unwrap_or(mode);
        let root = user
            .root
            .as_deref()
            .map(|r| absolutize(&root, r))
            .unwrap_or(root);
        let mut config = normalize::seed(
            &user,
            root,
            mode,
            self.command,
            config_file,
            &env_source,
            &self.overrides,
        );
        normalize::normalize(
            &mut config,
            NormalizeContext {
                user: &user,
                overrides: &self.overrides,
            },
        )
        .await?;

        dispatcher.config_resolved(&config).await?;
        info!(
            root = %config.root.display(),
            mode = %config.mode,
            command = ?config.command,
            plugins = dispatcher.registry().len(),
            "Config resolved"
        );

        Ok(ResolvedConfigSession {
            config: Arc::new(config),
            dispatcher,
        })
    }

    async fn load_file(
        &self,
        root: &Path,
        path: &Path,
        env: ConfigEnv,
    ) -> LoomResult<LoadedConfigFile> {
        match self.loader.load(root, path, env, &self.overrides).await {
            Ok(loaded) => Ok(loaded),
            Err(err) => {
                if let ConfigError::LoadFailed {
                    hints,
                    fatal: false,
                    ..
                } = &err
                {
                    for hint in hints {
                        warn!(file = %path.display(), %hint, "Config file failed to load");
                    }
                } else {
                    error!(file = %path.display(), error = %err, "Config file failed to load");
                }
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use loom_core::ErrorKind;
    use loom_core::traits::{CompilerContext, ConfigExport};
    use loom_core::types::{Mode, ResolveParam};
    use loom_plugin::Plugin;
    use loom_plugin::testing::MockCompiler;

    use crate::bootstrap::{ConfigModule, ConfigModuleEvaluator};
    use crate::inline::{InlineBuildOptions, InlineServerOptions};

    /// Returns a fixed partial config and records the config it saw.
    #[derive(Debug)]
    struct ContributingPlugin {
        name: &'static str,
        contribution: Value,
        seen: Mutex<Vec<UserConfig>>,
    }

    impl ContributingPlugin {
        fn new(name: &'static str, contribution: Value) -> Arc<Self> {
            Arc::new(Self {
                name,
                contribution,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Plugin for ContributingPlugin {
        fn name(&self) -> &str {
            self.name
        }

        async fn config(&self, config: &UserConfig) -> LoomResult<Option<Value>> {
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(config.clone());
            Ok(Some(self.contribution.clone()))
        }
    }

    struct ObjectEvaluator(Value);

    #[async_trait]
    impl ConfigModuleEvaluator for ObjectEvaluator {
        async fn evaluate(&self, _path: &Path) -> LoomResult<ConfigModule> {
            Ok(ConfigModule {
                export: ConfigExport::Object(self.0.clone()),
                plugins: Vec::new(),
            })
        }
    }

    async fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, content) in files {
            tokio::fs::write(dir.path().join(name), content)
                .await
                .expect("write");
        }
        dir
    }

    fn inline(root: &Path) -> InlineConfig {
        InlineConfig {
            root: Some(root.to_path_buf()),
            env: Some(BTreeMap::new()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_merge_precedence() {
        let dir = project(&[
            ("index.html", "<html></html>"),
            (
                "loom.config.json",
                r#"{ "server": { "port": 3000, "host": "0.0.0.0" }, "compilation": { "sourcemap": false } }"#,
            ),
        ])
        .await;
        let mut options = inline(dir.path());
        options.server = Some(InlineServerOptions {
            port: Some(4000),
            ..Default::default()
        });

        let session = ConfigResolver::new(Command::Serve, EnvOverrides::default())
            .resolve(&options)
            .await
            .expect("resolve");
        let config = &session.config;

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.compilation.sourcemap);
        assert!(!config.server.strict_port);
        assert_eq!(
            config.config_file_path,
            Some(dir.path().join("loom.config.json"))
        );
    }

    #[tokio::test]
    async fn test_config_hooks_run_in_order_over_merged_config() {
        let dir = project(&[("index.html", "<html></html>")]).await;
        let first = ContributingPlugin::new("first", json!({ "compilation": { "minify": true } }));
        let second = ContributingPlugin::new("second", json!({ "server": { "port": 5000 } }));

        let mut options = inline(dir.path());
        options.build = Some(InlineBuildOptions {
            sourcemap: Some(false),
            ..Default::default()
        });
        let session = ConfigResolver::new(Command::Serve, EnvOverrides::default())
            .with_plugins(vec![
                PluginEntry::Native(first.clone()),
                PluginEntry::Native(second.clone()),
            ])
            .resolve(&options)
            .await
            .expect("resolve");

        let seen_by_second = second.seen.lock().unwrap_or_else(|e| e.into_inner()).clone();
        assert_eq!(
            seen_by_second[0].compilation().and_then(|c| c.minify),
            Some(true)
        );
        assert_eq!(
            seen_by_second[0].compilation().and_then(|c| c.sourcemap),
            Some(false)
        );
        assert!(session.config.compilation.minify);
        assert_eq!(session.config.server.port, 5000);
    }

    #[tokio::test]
    async fn test_missing_entry_is_input_resolution_error() {
        let dir = project(&[]).await;
        let err = ConfigResolver::new(Command::Build, EnvOverrides::default())
            .resolve(&inline(dir.path()))
            .await
            .expect_err("no entry");
        assert!(err.is(ErrorKind::InputResolution));
    }

    #[tokio::test]
    async fn test_load_failure_policy() {
        let dir = project(&[
            ("index.html", "<html></html>"),
            ("loom.config.json", "{ broken"),
        ])
        .await;

        let err = ConfigResolver::new(Command::Build, EnvOverrides::default())
            .resolve(&inline(dir.path()))
            .await
            .expect_err("production");
        assert!(err.is(ErrorKind::ConfigLoad));
        assert!(!err.message.contains("hint:"));

        let err = ConfigResolver::new(Command::Serve, EnvOverrides::default())
            .resolve(&inline(dir.path()))
            .await
            .expect_err("development");
        assert!(err.is(ErrorKind::ConfigLoad));
        assert_eq!(err.message.matches("hint:").count(), 2);
    }

    #[tokio::test]
    async fn test_script_config_through_stage0() {
        let dir = project(&[
            ("index.html", "<html></html>"),
            ("loom.config.ts", "export default { server: { port: 7777 } }"),
        ])
        .await;
        let compiler = MockCompiler::new(dir.path());
        let bootstrap = ConfigBootstrap::new(
            Arc::new(compiler.clone()),
            Arc::new(ObjectEvaluator(json!({
                "server": { "port": 7777 },
                "compilation": { "external": ["^react$"] }
            }))),
        );

        let session = ConfigResolver::new(Command::Serve, EnvOverrides::default())
            .with_bootstrap(bootstrap)
            .resolve(&inline(dir.path()))
            .await
            .expect("resolve");

        assert_eq!(session.config.server.port, 7777);
        assert_eq!(compiler.compiled_configs().len(), 1);

        let ctx: Arc<dyn CompilerContext> = compiler.context();
        let resolved = session
            .dispatcher
            .resolve(&ResolveParam::new("react", Some("/app/main.ts")), &ctx)
            .await
            .expect("dispatch")
            .expect("external match");
        assert!(resolved.external);
    }

    #[tokio::test]
    async fn test_inline_mode_overrides_command_default() {
        let dir = project(&[("index.html", "<html></html>")]).await;
        let mut options = inline(dir.path());
        options.mode = Some(Mode::Development);

        let session = ConfigResolver::new(Command::Build, EnvOverrides::default())
            .resolve(&options)
            .await
            .expect("resolve");
        assert_eq!(session.config.mode, Mode::Development);
        assert!(!session.config.compilation.minify);
        assert!(session.config.server.hmr.is_none());
    }

    #[tokio::test]
    async fn test_mode_from_config_hook_drives_normalization() {
        let dir = project(&[("index.html", "<html></html>")]).await;
        let plugin = ContributingPlugin::new("prod", json!({ "mode": "production" }));

        let session = ConfigResolver::new(Command::Serve, EnvOverrides::default())
            .with_plugins(vec![PluginEntry::Native(plugin)])
            .resolve(&inline(dir.path()))
            .await
            .expect("resolve");
        let config = &session.config;

        assert_eq!(config.mode, Mode::Production);
        assert!(!config.compilation.lazy_compilation);
        assert!(config.compilation.tree_shaking);
        assert!(config.compilation.minify);
        assert_eq!(
            config.compilation.define["process.env.NODE_ENV"],
            json!("production")
        );
    }
}
