//! The compatibility context handed to ecosystem hooks.

use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use loom_core::traits::CompilerContext;
use loom_core::types::query::with_query;
use loom_core::types::{EmitFileParams, ResolveKind, ResolveParam};
use loom_core::{LoomError, LoomResult};

use crate::hooks::definitions::HookKind;

/// A module resolved through the context's `resolve` proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    /// Resolved id, query included.
    pub id: String,
    /// Whether the module is external.
    pub external: bool,
    /// Whether the module has side effects.
    pub module_side_effects: bool,
}

/// An asset emitted with `emitFile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Output file name.
    pub file_name: String,
    /// Raw bytes.
    pub source: Vec<u8>,
}

/// The context of one ecosystem hook call.
pub struct EcosystemContext {
    plugin: String,
    hook: HookKind,
    file: Option<String>,
    compiler: Arc<dyn CompilerContext>,
}

impl EcosystemContext {
    /// Creates a context for `plugin` running `hook` on `file`.
    pub fn new(
        plugin: impl Into<String>,
        hook: HookKind,
        file: Option<String>,
        compiler: Arc<dyn CompilerContext>,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            file,
            compiler,
        }
    }

    /// Name of the plugin being called.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Hook being called.
    pub fn hook(&self) -> HookKind {
        self.hook
    }

    /// File being processed, if the hook is per-module.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Resolves through the compiler, skipping the calling plugin.
    pub async fn resolve(
        &self,
        source: &str,
        importer: Option<&str>,
    ) -> LoomResult<Option<ResolvedId>> {
        let param = ResolveParam {
            source: source.to_string(),
            importer: importer.map(str::to_string),
            kind: ResolveKind::Import,
        };
        let resolved = self.compiler.resolve(&param, Some(&self.plugin)).await?;
        Ok(resolved.map(|result| ResolvedId {
            id: with_query(&result.resolved_path, &result.query),
            external: result.external,
            module_side_effects: result.side_effects,
        }))
    }

    /// Rebuilds the current module whenever `target` changes.
    pub async fn add_watch_file(&self, target: &str) -> LoomResult<()> {
        let Some(current) = self.file.as_deref() else {
            return Err(self.error("addWatchFile called outside of a module hook"));
        };
        self.compiler.add_watch_file(current, target).await
    }

    /// Emits an asset and returns its file name.
    pub async fn emit_file(&self, asset: EmittedAsset) -> LoomResult<String> {
        let resource_type = Path::new(&asset.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string();
        let resolved_path = self.file.clone().unwrap_or_else(|| self.plugin.clone());

        self.compiler
            .emit_file(EmitFileParams {
                resolved_path,
                name: asset.file_name.clone(),
                content: asset.source,
                resource_type,
            })
            .await?;
        Ok(asset.file_name)
    }

    /// `this.warn`.
    pub fn warn(&self, message: &str) {
        warn!(plugin = %self.plugin, hook = %self.hook.foreign_name(), "{message}");
    }

    /// `this.info`.
    pub fn info(&self, message: &str) {
        info!(plugin = %self.plugin, hook = %self.hook.foreign_name(), "{message}");
    }

    /// `this.debug`.
    pub fn debug(&self, message: &str) {
        debug!(plugin = %self.plugin, hook = %self.hook.foreign_name(), "{message}");
    }

    /// `this.error`: builds the error for the caller to return.
    pub fn error(&self, message: &str) -> LoomError {
        let mut text = format!("[{}] {}: {message}", self.plugin, self.hook.foreign_name());
        if let Some(file) = &self.file {
            text.push_str(&format!(" ({file})"));
        }
        LoomError::plugin(text)
    }

    /// `this.cache`. Every operation on it fails.
    pub fn cache(&self) -> CompatCache<'_> {
        CompatCache { ctx: self }
    }

    /// `this.parse`. Unsupported.
    pub fn parse(&self, _code: &str) -> LoomResult<serde_json::Value> {
        Err(self.unsupported("parse"))
    }

    /// `this.getModuleInfo`. Unsupported.
    pub fn get_module_info(&self, _id: &str) -> LoomResult<serde_json::Value> {
        Err(self.unsupported("getModuleInfo"))
    }

    /// `this.getModuleIds`. Unsupported.
    pub fn get_module_ids(&self) -> LoomResult<Vec<String>> {
        Err(self.unsupported("getModuleIds"))
    }

    /// `this.getFileName`. Unsupported.
    pub fn get_file_name(&self, _reference_id: &str) -> LoomResult<String> {
        Err(self.unsupported("getFileName"))
    }

    /// `this.load`. Unsupported.
    pub async fn load(&self, _id: &str) -> LoomResult<serde_json::Value> {
        Err(self.unsupported("load"))
    }

    fn unsupported(&self, feature: &str) -> LoomError {
        LoomError::incompatible_plugin(
            &self.plugin,
            self.hook.foreign_name(),
            feature,
            self.file.as_deref(),
        )
    }
}

impl std::fmt::Debug for EcosystemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcosystemContext")
            .field("plugin", &self.plugin)
            .field("hook", &self.hook)
            .field("file", &self.file)
            .finish()
    }
}

/// `this.cache`. Every operation fails with an incompatibility error.
#[derive(Debug, Clone, Copy)]
pub struct CompatCache<'a> {
    ctx: &'a EcosystemContext,
}

impl CompatCache<'_> {
    /// `cache.get`.
    pub fn get(&self, _key: &str) -> LoomResult<Option<serde_json::Value>> {
        Err(self.ctx.unsupported("cache.get"))
    }

    /// `cache.set`.
    pub fn set(&self, _key: &str, _value: serde_json::Value) -> LoomResult<()> {
        Err(self.ctx.unsupported("cache.set"))
    }

    /// `cache.has`.
    pub fn has(&self, _key: &str) -> LoomResult<bool> {
        Err(self.ctx.unsupported("cache.has"))
    }

    /// `cache.delete`.
    pub fn delete(&self, _key: &str) -> LoomResult<bool> {
        Err(self.ctx.unsupported("cache.delete"))
    }
}

/// Per-(hook, file) contexts of one adapter, valid for one compilation pass.
#[derive(Debug, Default)]
pub struct ContextArena {
    contexts: DashMap<(HookKind, String), Arc<EcosystemContext>>,
}

impl ContextArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context for `(hook, file)`, creating it on first use.
    pub fn get_or_create(
        &self,
        plugin: &str,
        hook: HookKind,
        file: Option<&str>,
        compiler: &Arc<dyn CompilerContext>,
    ) -> Arc<EcosystemContext> {
        let key = (hook, file.unwrap_or_default().to_string());
        self.contexts
            .entry(key)
            .or_insert_with(|| {
                Arc::new(EcosystemContext::new(
                    plugin,
                    hook,
                    file.map(str::to_string),
                    compiler.clone(),
                ))
            })
            .value()
            .clone()
    }

    /// Drops every context.
    pub fn clear(&self) {
        self.contexts.clear();
    }

    /// Returns the number of cached contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Returns whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCompiler;
    use loom_core::ErrorKind;
    use loom_core::types::ResolveResult;

    fn context(compiler: &MockCompiler, file: Option<&str>) -> EcosystemContext {
        EcosystemContext::new(
            "legacy-plugin",
            HookKind::Transform,
            file.map(str::to_string),
            compiler.context(),
        )
    }

    #[test]
    fn test_cache_get_names_plugin_and_hook() {
        let compiler = MockCompiler::new("/app");
        let ctx = context(&compiler, Some("/app/src/a.ts"));

        let err = ctx.cache().get("key").expect_err("unsupported");
        assert!(err.is(ErrorKind::IncompatiblePlugin));
        assert!(err.message.contains("legacy-plugin"));
        assert!(err.message.contains("transform"));
        assert!(err.message.contains("cache.get"));
        assert!(err.message.contains("/app/src/a.ts"));
    }

    #[tokio::test]
    async fn test_every_unsupported_feature_fails() {
        let compiler = MockCompiler::new("/app");
        let ctx = context(&compiler, None);

        assert!(ctx.parse("x").is_err_and(|e| e.message.contains("parse")));
        assert!(ctx.get_module_info("x").is_err());
        assert!(ctx.get_module_ids().is_err());
        assert!(ctx.get_file_name("ref").is_err());
        assert!(ctx.load("x").await.is_err_and(|e| e.is(ErrorKind::IncompatiblePlugin)));
        assert!(ctx.cache().set("k", serde_json::Value::Null).is_err());
    }

    #[tokio::test]
    async fn test_resolve_proxy_skips_caller_and_keeps_query() {
        let compiler = MockCompiler::new("/app");
        compiler.add_resolution(
            "./style.css",
            ResolveResult {
                resolved_path: "/app/src/style.css".to_string(),
                query: vec![("inline".to_string(), String::new())],
                side_effects: true,
                ..Default::default()
            },
        );
        let ctx = context(&compiler, Some("/app/src/a.ts"));

        let resolved = ctx
            .resolve("./style.css", Some("/app/src/a.ts"))
            .await
            .expect("resolve")
            .expect("resolved");
        assert_eq!(resolved.id, "/app/src/style.css?inline");
        assert!(resolved.module_side_effects);
        assert_eq!(
            compiler.resolve_calls(),
            vec![("./style.css".to_string(), Some("legacy-plugin".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_emit_file_uses_extension_as_resource_type() {
        let compiler = MockCompiler::new("/app");
        let ctx = context(&compiler, Some("/app/src/a.ts"));

        let name = ctx
            .emit_file(EmittedAsset {
                file_name: "logo.svg".to_string(),
                source: b"<svg/>".to_vec(),
            })
            .await
            .expect("emit");
        assert_eq!(name, "logo.svg");

        let emitted = compiler.emitted_files();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].resource_type, "svg");
        assert_eq!(emitted[0].resolved_path, "/app/src/a.ts");
    }

    #[tokio::test]
    async fn test_add_watch_file_needs_a_module() {
        let compiler = MockCompiler::new("/app");
        assert!(context(&compiler, None).add_watch_file("/app/x.json").await.is_err());

        context(&compiler, Some("/app/src/a.ts"))
            .add_watch_file("/app/x.json")
            .await
            .expect("watch");
        assert_eq!(
            compiler.watch_files(),
            vec![("/app/src/a.ts".to_string(), "/app/x.json".to_string())]
        );
    }

    #[test]
    fn test_arena_reuses_contexts_until_cleared() {
        let compiler = MockCompiler::new("/app");
        let ctx = compiler.context();
        let arena = ContextArena::new();

        let first = arena.get_or_create("p", HookKind::Load, Some("/a.ts"), &ctx);
        let again = arena.get_or_create("p", HookKind::Load, Some("/a.ts"), &ctx);
        let other = arena.get_or_create("p", HookKind::Transform, Some("/a.ts"), &ctx);
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(arena.len(), 2);

        arena.clear();
        assert!(arena.is_empty());
        let fresh = arena.get_or_create("p", HookKind::Load, Some("/a.ts"), &ctx);
        assert!(!Arc::ptr_eq(&first, &fresh));
    }
}
