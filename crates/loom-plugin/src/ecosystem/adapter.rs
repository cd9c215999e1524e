//! Exposes one ecosystem plugin as a native [`Plugin`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::debug;

use loom_core::LoomResult;
use loom_core::config::{ResolvedConfig, UserConfig};
use loom_core::merge::deep_merge;
use loom_core::traits::{CompilerContext, DevServer};
use loom_core::types::query::with_query;
use loom_core::types::{
    ConfigEnv, LoadParam, LoadResult, ModuleType, ResolveParam, ResolveResult, TransformParam,
    TransformResult, UpdateModulesParam,
};

use super::config_map::{to_foreign, to_native};
use super::context::{ContextArena, EcosystemContext};
use super::dev_server::{CompatDevServer, HotUpdateContext};
use super::plugin::EcosystemPlugin;
use crate::graph::ModuleGraphShadow;
use crate::hooks::definitions::HookKind;
use crate::plugin::{Plugin, priority_of};

/// Wraps one ecosystem plugin.
///
/// The adapter keeps a foreign-shaped view of the config, refreshed from
/// the native config on every `config`/`configResolved` call. When the
/// plugin's `apply` condition is false, every hook is a no-op.
pub struct EcosystemAdapter {
    plugin: Arc<dyn EcosystemPlugin>,
    env: ConfigEnv,
    enabled: bool,
    view: RwLock<Value>,
    server: RwLock<Option<Arc<CompatDevServer>>>,
    contexts: ContextArena,
}

impl EcosystemAdapter {
    /// Wraps `plugin`, evaluating its `apply` condition against `config`.
    pub fn new(
        plugin: Arc<dyn EcosystemPlugin>,
        config: &UserConfig,
        env: ConfigEnv,
    ) -> LoomResult<Self> {
        let mut view = to_foreign(&config.to_value()?);
        deep_merge(&mut view, env_fields(&env));

        let enabled = plugin
            .apply()
            .map(|apply| apply.evaluate(&view, &env))
            .unwrap_or(true);
        if !enabled {
            debug!(plugin = %plugin.name(), "Ecosystem plugin disabled by apply");
        }

        Ok(Self {
            plugin,
            env,
            enabled,
            view: RwLock::new(view),
            server: RwLock::new(None),
            contexts: ContextArena::new(),
        })
    }

    /// Returns whether the plugin's `apply` condition held.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns a snapshot of the foreign config view.
    pub async fn foreign_config(&self) -> Value {
        self.view.read().await.clone()
    }

    fn context(
        &self,
        hook: HookKind,
        file: Option<&str>,
        ctx: &Arc<dyn CompilerContext>,
    ) -> Arc<EcosystemContext> {
        self.contexts
            .get_or_create(self.plugin.name(), hook, file, ctx)
    }

    /// Refreshes the view from a native config tree.
    async fn refresh_view(&self, native: &Value) {
        let mut view = self.view.write().await;
        deep_merge(&mut view, to_foreign(native));
        deep_merge(&mut view, env_fields(&self.env));
    }
}

/// Foreign-only fields derived from the command and mode.
fn env_fields(env: &ConfigEnv) -> Value {
    json!({
        "command": env.command.foreign_name(),
        "mode": env.mode.as_str(),
        "isProduction": env.mode.is_production(),
    })
}

impl std::fmt::Debug for EcosystemAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcosystemAdapter")
            .field("plugin", &self.plugin.name())
            .field("enabled", &self.enabled)
            .field("contexts", &self.contexts.len())
            .finish()
    }
}

#[async_trait]
impl Plugin for EcosystemAdapter {
    fn name(&self) -> &str {
        self.plugin.name()
    }

    fn priority(&self) -> i32 {
        priority_of(self.plugin.enforce())
    }

    async fn config(&self, config: &UserConfig) -> LoomResult<Option<Value>> {
        self.refresh_view(&config.to_value()?).await;
        if !self.enabled {
            return Ok(None);
        }

        let current = self.foreign_config().await;
        let Some(partial) = self.plugin.config(&current, &self.env).await? else {
            return Ok(None);
        };

        let mut view = self.view.write().await;
        deep_merge(&mut view, partial);
        Ok(Some(to_native(&view)))
    }

    async fn config_resolved(&self, config: &ResolvedConfig) -> LoomResult<()> {
        self.refresh_view(&serde_json::to_value(config)?).await;
        if !self.enabled {
            return Ok(());
        }
        let view = self.foreign_config().await;
        self.plugin.config_resolved(&view).await
    }

    async fn configure_dev_server(&self, server: Arc<dyn DevServer>) -> LoomResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let compat = Arc::new(CompatDevServer::new(server, self.foreign_config().await));
        *self.server.write().await = Some(compat.clone());
        self.plugin.configure_server(&compat).await
    }

    async fn build_start(&self, ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        self.contexts.clear();
        if !self.enabled {
            return Ok(());
        }
        let context = self.context(HookKind::BuildStart, None, ctx);
        self.plugin.build_start(&context).await
    }

    async fn resolve(
        &self,
        param: &ResolveParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<ResolveResult>> {
        if !self.enabled {
            return Ok(None);
        }
        let context = self.context(HookKind::Resolve, param.importer.as_deref(), ctx);
        let output = self
            .plugin
            .resolve_id(&context, &param.source, param.importer.as_deref())
            .await?;
        Ok(output.map(|output| output.into_resolve_result()))
    }

    async fn load(
        &self,
        param: &LoadParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<LoadResult>> {
        if !self.enabled {
            return Ok(None);
        }
        let context = self.context(HookKind::Load, Some(&param.resolved_path), ctx);
        let id = with_query(&param.resolved_path, &param.query);
        let Some(output) = self.plugin.load(&context, &id).await? else {
            return Ok(None);
        };

        let (content, _) = output.into_parts();
        Ok(Some(LoadResult {
            content,
            module_type: ModuleType::infer(&param.resolved_path, &param.query),
            source_map: None,
        }))
    }

    async fn transform(
        &self,
        param: &TransformParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<TransformResult>> {
        if !self.enabled {
            return Ok(None);
        }
        let context = self.context(HookKind::Transform, Some(&param.resolved_path), ctx);
        let id = with_query(&param.resolved_path, &param.query);
        let Some(output) = self.plugin.transform(&context, &param.content, &id).await? else {
            return Ok(None);
        };

        let (content, source_map) = output.into_parts();
        Ok(Some(TransformResult {
            content,
            module_type: Some(ModuleType::infer(&param.resolved_path, &param.query)),
            source_map,
            ignore_previous_source_map: false,
        }))
    }

    async fn build_end(&self, ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        if !self.enabled {
            return Ok(());
        }
        let context = self.context(HookKind::BuildEnd, None, ctx);
        self.plugin.build_end(&context).await
    }

    async fn finish(&self, ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        let result = if self.enabled {
            let context = self.context(HookKind::Finish, None, ctx);
            self.plugin.close_bundle(&context).await
        } else {
            Ok(())
        };
        self.contexts.clear();
        result
    }

    fn handles_update_modules(&self) -> bool {
        self.enabled
    }

    async fn update_modules(
        &self,
        param: &UpdateModulesParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<Vec<String>>> {
        self.contexts.clear();
        if !self.enabled {
            return Ok(None);
        }

        let shadow = ModuleGraphShadow::build(ctx.as_ref(), param.files()).await?;
        let server = self.server.read().await.clone();

        let mut affected = Vec::new();
        for file in param.files() {
            let modules = shadow.modules_by_file(file).to_vec();
            if let Some(server) = &server {
                server.module_graph().record(&modules);
            }

            let hot = HotUpdateContext::new(file, modules, server.clone());
            match self.plugin.handle_hot_update(&hot).await? {
                Some(ids) => affected.extend(ids),
                None => affected.extend(hot.module_ids()),
            }
        }

        debug!(
            plugin = %self.plugin.name(),
            files = param.paths.len(),
            modules = affected.len(),
            "Hot update handled"
        );
        Ok(Some(affected))
    }
}
