//! The implicit, always-last external-module plugin.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use loom_core::LoomResult;
use loom_core::config::{ResolvedConfig, UserConfig};
use loom_core::traits::CompilerContext;
use loom_core::types::{ResolveParam, ResolveResult};

use crate::hooks::filter::PatternSet;
use crate::plugin::Plugin;

/// Marks sources matching `compilation.external` as external.
///
/// Patterns are seeded from the user config and replaced by the resolved
/// ones once `configResolved` runs.
#[derive(Debug)]
pub struct ExternalModulePlugin {
    patterns: RwLock<PatternSet>,
}

impl ExternalModulePlugin {
    /// Reserved plugin name.
    pub const NAME: &'static str = "loom:external";

    /// Creates the plugin from the user config's external patterns.
    pub fn new(config: &UserConfig) -> LoomResult<Self> {
        let sources = config
            .compilation()
            .and_then(|compilation| compilation.external.clone())
            .unwrap_or_default();
        Ok(Self {
            patterns: RwLock::new(PatternSet::new(&sources)?),
        })
    }
}

#[async_trait]
impl Plugin for ExternalModulePlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn config_resolved(&self, config: &ResolvedConfig) -> LoomResult<()> {
        let patterns = PatternSet::new(&config.compilation.external)?;
        *self.patterns.write().await = patterns;
        Ok(())
    }

    async fn resolve(
        &self,
        param: &ResolveParam,
        _ctx: &Arc<dyn CompilerContext>,
    ) -> LoomResult<Option<ResolveResult>> {
        if !self.patterns.read().await.matches_any(&param.source) {
            return Ok(None);
        }

        debug!(source = %param.source, "Resolved as external");
        Ok(Some(ResolveResult {
            resolved_path: param.source.clone(),
            external: true,
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCompiler;
    use loom_core::config::compilation::UserCompilationConfig;
    use loom_core::types::{Command, Mode};

    fn config_with_external(patterns: &[&str]) -> UserConfig {
        UserConfig {
            compilation: Some(UserCompilationConfig {
                external: Some(patterns.iter().map(|p| p.to_string()).collect()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_matching_source_is_external() {
        let plugin =
            ExternalModulePlugin::new(&config_with_external(&["^react$"])).expect("plugin");
        let ctx = MockCompiler::new("/app").context();

        let result = plugin
            .resolve(&ResolveParam::new("react", Some("/app/main.ts")), &ctx)
            .await
            .expect("resolve");
        assert_eq!(
            result,
            Some(ResolveResult {
                resolved_path: "react".to_string(),
                external: true,
                ..Default::default()
            })
        );

        let miss = plugin
            .resolve(&ResolveParam::new("react-dom", None), &ctx)
            .await
            .expect("resolve");
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_no_patterns_never_match() {
        let plugin = ExternalModulePlugin::new(&UserConfig::default()).expect("plugin");
        let ctx = MockCompiler::new("/app").context();
        let result = plugin
            .resolve(&ResolveParam::new("anything", None), &ctx)
            .await
            .expect("resolve");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_config_resolved_replaces_patterns() {
        let plugin = ExternalModulePlugin::new(&UserConfig::default()).expect("plugin");
        let mut resolved = ResolvedConfig::new("/app", Mode::Development, Command::Serve);
        resolved.compilation.external = vec!["^node:".to_string()];
        plugin.config_resolved(&resolved).await.expect("config resolved");

        let ctx = MockCompiler::new("/app").context();
        let result = plugin
            .resolve(&ResolveParam::new("node:fs", None), &ctx)
            .await
            .expect("resolve");
        assert!(result.is_some_and(|r| r.external));
    }
}
