//! The native plugin contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use loom_core::LoomResult;
use loom_core::config::{ResolvedConfig, UserConfig};
use loom_core::traits::{CompilerContext, DevServer};
use loom_core::types::{
    LoadParam, LoadResult, ResolveParam, ResolveResult, TransformParam, TransformResult,
    UpdateModulesParam,
};

use crate::ecosystem::EcosystemPlugin;
use crate::hooks::filter::HookFilters;

/// Priority of a plugin without an enforce stage.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Ordering stage of a plugin relative to unmarked ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    /// Runs before unmarked plugins.
    Pre,
    /// Runs after unmarked plugins.
    Post,
}

impl Enforce {
    /// Returns the priority of this stage (higher runs first).
    pub fn priority(&self) -> i32 {
        match self {
            Self::Pre => DEFAULT_PRIORITY + 1,
            Self::Post => DEFAULT_PRIORITY - 1,
        }
    }
}

/// Maps an optional enforce stage to a priority.
pub fn priority_of(enforce: Option<Enforce>) -> i32 {
    enforce.map(|e| e.priority()).unwrap_or(DEFAULT_PRIORITY)
}

/// Trait implemented by native plugins.
///
/// Every hook has a no-op default; returning `Ok(None)` from a first-match
/// hook means "not mine, try the next plugin".
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Execution priority (higher runs first).
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Request filters for `resolve`, `load`, and `transform`.
    fn filters(&self) -> HookFilters {
        HookFilters::default()
    }

    /// Returns a partial config merged into the running config.
    async fn config(&self, _config: &UserConfig) -> LoomResult<Option<Value>> {
        Ok(None)
    }

    /// Observes the final resolved config.
    async fn config_resolved(&self, _config: &ResolvedConfig) -> LoomResult<()> {
        Ok(())
    }

    /// Receives the running dev server.
    async fn configure_dev_server(&self, _server: Arc<dyn DevServer>) -> LoomResult<()> {
        Ok(())
    }

    /// Fired once before a compilation pass.
    async fn build_start(&self, _ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        Ok(())
    }

    /// Resolves a specifier.
    async fn resolve(
        &self,
        _param: &ResolveParam,
        _ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<ResolveResult>> {
        Ok(None)
    }

    /// Loads a resolved module.
    async fn load(
        &self,
        _param: &LoadParam,
        _ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<LoadResult>> {
        Ok(None)
    }

    /// Transforms a loaded module.
    async fn transform(
        &self,
        _param: &TransformParam,
        _ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<TransformResult>> {
        Ok(None)
    }

    /// Fired once after all modules are built.
    async fn build_end(&self, _ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        Ok(())
    }

    /// Fired once after resources are written.
    async fn finish(&self, _ctx: &Arc<dyn CompilerContext>) -> LoomResult<()> {
        Ok(())
    }

    /// Whether this plugin takes part in `update_modules`. Plugins that
    /// override [`update_modules`](Self::update_modules) return `true`.
    fn handles_update_modules(&self) -> bool {
        false
    }

    /// Returns the module ids affected by changed files.
    ///
    /// `Ok(None)` defers to the modules the graph records for each file.
    async fn update_modules(
        &self,
        _param: &UpdateModulesParam,
        _ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<Vec<String>>> {
        Ok(None)
    }
}

/// One entry of the user's plugin list.
#[derive(Clone)]
pub enum PluginEntry {
    /// A native plugin, used as is.
    Native(Arc<dyn Plugin>),
    /// An ecosystem plugin, wrapped by an adapter at registry build time.
    Ecosystem(Arc<dyn EcosystemPlugin>),
}

impl PluginEntry {
    /// Returns the plugin's declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Native(plugin) => plugin.name(),
            Self::Ecosystem(plugin) => plugin.name(),
        }
    }
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native(plugin) => f.debug_tuple("Native").field(&plugin.name()).finish(),
            Self::Ecosystem(plugin) => f.debug_tuple("Ecosystem").field(&plugin.name()).finish(),
        }
    }
}
