//! Hook dispatcher: walks the sorted plugin list and combines results.
//!
//! - `resolve`, `load`, `transform`: plugins whose filter matches are tried
//!   in order; the first `Some` wins and the rest are skipped.
//! - `configResolved`, `configureDevServer`, `buildStart`, `buildEnd`,
//!   `finish`: every plugin runs in order; the first error aborts the rest.
//! - `updateModules`: every plugin runs; returned ids are unioned. A plugin
//!   returning `None` contributes the affected modules of the changed files.
//! - `config`: every plugin runs in order, each partial config merged into
//!   the running config before the next plugin sees it.
//!
//! Each plugin is awaited before the next is tried. There is no timeout.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use loom_core::config::{ResolvedConfig, UserConfig};
use loom_core::merge::deep_merge;
use loom_core::traits::{CompilerContext, DevServer};
use loom_core::types::{
    LoadParam, LoadResult, ResolveParam, ResolveResult, TransformParam, TransformResult,
    UpdateModulesParam,
};
use loom_core::{LoomError, LoomResult};

use super::definitions::HookKind;
use crate::graph::ModuleGraphShadow;
use crate::registry::PluginRegistry;

/// Dispatches hooks to the plugins of one registry.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Plugin registry.
    registry: Arc<PluginRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    /// Returns a reference to the plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Runs every `config` hook, merging each contribution in turn.
    pub async fn config(&self, config: UserConfig) -> LoomResult<UserConfig> {
        let mut current = config.to_value()?;
        let mut typed = config;

        for descriptor in self.registry.plugins() {
            let Some(partial) = descriptor.plugin.config(&typed).await? else {
                continue;
            };
            debug!(
                hook = %HookKind::Config,
                plugin = %descriptor.name,
                "Merging plugin config"
            );
            deep_merge(&mut current, partial);
            typed = UserConfig::from_value(current.clone())?;
        }

        Ok(typed)
    }

    /// Runs every `configResolved` hook.
    pub async fn config_resolved(&self, config: &ResolvedConfig) -> LoomResult<()> {
        for descriptor in self.registry.plugins() {
            debug!(hook = %HookKind::ConfigResolved, plugin = %descriptor.name, "Calling hook");
            descriptor.plugin.config_resolved(config).await?;
        }
        Ok(())
    }

    /// Runs every `configureDevServer` hook.
    pub async fn configure_dev_server(&self, server: Arc<dyn DevServer>) -> LoomResult<()> {
        for descriptor in self.registry.plugins() {
            debug!(
                hook = %HookKind::ConfigureDevServer,
                plugin = %descriptor.name,
                "Calling hook"
            );
            descriptor.plugin.configure_dev_server(server.clone()).await?;
        }
        Ok(())
    }

    /// Runs every `buildStart` hook.
    pub async fn build_start(&self, ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        self.run_lifecycle(HookKind::BuildStart, ctx).await
    }

    /// Runs every `buildEnd` hook.
    pub async fn build_end(&self, ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        self.run_lifecycle(HookKind::BuildEnd, ctx).await
    }

    /// Runs every `finish` hook.
    pub async fn finish(&self, ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        self.run_lifecycle(HookKind::Finish, ctx).await
    }

    async fn run_lifecycle(
        &self,
        hook: HookKind,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<()> {
        for descriptor in self.registry.plugins() {
            debug!(hook = %hook, plugin = %descriptor.name, "Calling hook");
            match hook {
                HookKind::BuildStart => descriptor.plugin.build_start(ctx).await?,
                HookKind::BuildEnd => descriptor.plugin.build_end(ctx).await?,
                HookKind::Finish => descriptor.plugin.finish(ctx).await?,
                other => {
                    return Err(LoomError::internal(format!(
                        "{other} is not a lifecycle hook"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolves a specifier with the first plugin that answers.
    pub async fn resolve(
        &self,
        param: &ResolveParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<ResolveResult>> {
        self.resolve_skipping(param, ctx, None).await
    }

    /// Like [`resolve`](Self::resolve), but never calls the plugin named
    /// `caller`. Used when a plugin resolves through the compiler.
    pub async fn resolve_skipping(
        &self,
        param: &ResolveParam,
        ctx: &Arc<dyn CompilerContext>,
        caller: Option<&str>,
    ) -> LoomResult<Option<ResolveResult>> {
        for descriptor in self.registry.plugins() {
            if caller == Some(descriptor.name.as_str())
                || !descriptor.filters.resolve.matches_resolve(param)
            {
                continue;
            }
            if let Some(result) = descriptor.plugin.resolve(param, ctx).await? {
                debug!(
                    hook = %HookKind::Resolve,
                    plugin = %descriptor.name,
                    source = %param.source,
                    resolved = %result.resolved_path,
                    "Hook matched"
                );
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Loads a module with the first plugin that answers.
    pub async fn load(
        &self,
        param: &LoadParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<LoadResult>> {
        for descriptor in self.registry.plugins() {
            if !descriptor.filters.load.matches_load(param) {
                continue;
            }
            if let Some(result) = descriptor.plugin.load(param, ctx).await? {
                debug!(
                    hook = %HookKind::Load,
                    plugin = %descriptor.name,
                    module = %param.module_id,
                    "Hook matched"
                );
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Transforms a module with the first plugin that answers.
    pub async fn transform(
        &self,
        param: &TransformParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<TransformResult>> {
        for descriptor in self.registry.plugins() {
            if !descriptor.filters.transform.matches_transform(param) {
                continue;
            }
            if let Some(result) = descriptor.plugin.transform(param, ctx).await? {
                debug!(
                    hook = %HookKind::Transform,
                    plugin = %descriptor.name,
                    module = %param.module_id,
                    "Hook matched"
                );
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Computes the modules affected by a set of changed files.
    ///
    /// Only plugins that handle the hook take part. The result is
    /// deduplicated and keeps first-seen order.
    pub async fn update_modules(
        &self,
        param: &UpdateModulesParam,
        ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut affected = Vec::new();
        let shadow = OnceCell::new();

        for descriptor in self.registry.plugins() {
            if !descriptor.plugin.handles_update_modules() {
                continue;
            }
            debug!(hook = %HookKind::UpdateModules, plugin = %descriptor.name, "Calling hook");
            let ids = match descriptor.plugin.update_modules(param, ctx).await? {
                Some(ids) => ids,
                None => {
                    let shadow = shadow
                        .get_or_try_init(|| ModuleGraphShadow::build(ctx.as_ref(), param.files()))
                        .await?;
                    param
                        .files()
                        .flat_map(|file| shadow.modules_by_file(file))
                        .map(|node| node.id.clone())
                        .collect()
                }
            };

            for id in ids {
                if seen.insert(id.clone()) {
                    affected.push(id);
                }
            }
        }

        Ok(affected)
    }
}
