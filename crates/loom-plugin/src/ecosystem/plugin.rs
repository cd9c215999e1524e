//! The supported subset of the ecosystem plugin contract.
//!
//! Hooks take their compatibility context as an explicit first argument.
//! Every hook defaults to "not implemented", which the adapter treats as
//! returning nothing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use loom_core::LoomResult;
use loom_core::types::query::split_query;
use loom_core::types::{Command, ConfigEnv, ResolveResult};

use super::context::EcosystemContext;
use super::dev_server::{CompatDevServer, HotUpdateContext};
use crate::plugin::Enforce;

/// Predicate form of `apply`: `(config, env) => boolean`.
pub type ApplyPredicate = Arc<dyn Fn(&Value, &ConfigEnv) -> bool + Send + Sync>;

/// When an ecosystem plugin is active.
#[derive(Clone)]
pub enum Apply {
    /// Only for `serve` or `build`.
    Command(Command),
    /// Always on or always off.
    Enabled(bool),
    /// Decided by the plugin from the config view and env.
    Predicate(ApplyPredicate),
}

impl Apply {
    /// Evaluates the condition against the foreign config view.
    pub fn evaluate(&self, config: &Value, env: &ConfigEnv) -> bool {
        match self {
            Self::Command(command) => command.foreign_name() == env.command.foreign_name(),
            Self::Enabled(enabled) => *enabled,
            Self::Predicate(predicate) => predicate(config, env),
        }
    }
}

impl std::fmt::Debug for Apply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Self::Enabled(enabled) => f.debug_tuple("Enabled").field(enabled).finish(),
            Self::Predicate(_) => f.debug_tuple("Predicate").field(&"<function>").finish(),
        }
    }
}

/// Result of `resolveId`: a bare id or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolveIdOutput {
    /// A resolved id, possibly with a query.
    Id(String),
    /// A resolved id with flags.
    #[serde(rename_all = "camelCase")]
    Object {
        /// Resolved id, possibly with a query.
        id: String,
        /// Whether the module is external.
        #[serde(default)]
        external: Option<bool>,
        /// Whether the module has side effects.
        #[serde(default)]
        module_side_effects: Option<bool>,
    },
}

impl ResolveIdOutput {
    /// Converts to a native resolve result, splitting the query off the id.
    pub fn into_resolve_result(self) -> ResolveResult {
        let (id, external, side_effects) = match self {
            Self::Id(id) => (id, false, false),
            Self::Object {
                id,
                external,
                module_side_effects,
            } => (
                id,
                external.unwrap_or(false),
                module_side_effects.unwrap_or(false),
            ),
        };
        let (resolved_path, query) = split_query(&id);
        ResolveResult {
            resolved_path,
            query,
            side_effects,
            external,
            meta: Default::default(),
        }
    }
}

/// Result of `load` or `transform`: bare code or `{ code, map }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeOutput {
    /// Code only.
    Code(String),
    /// Code with an optional source map.
    Object {
        /// Module source.
        code: String,
        /// Source map, as a JSON object or a serialized string.
        #[serde(default)]
        map: Option<Value>,
    },
}

impl CodeOutput {
    /// Splits into content and a serialized source map.
    pub fn into_parts(self) -> (String, Option<String>) {
        match self {
            Self::Code(code) => (code, None),
            Self::Object { code, map } => {
                let map = match map {
                    None | Some(Value::Null) => None,
                    Some(Value::String(map)) => Some(map),
                    Some(map) => Some(map.to_string()),
                };
                (code, map)
            }
        }
    }
}

/// A plugin written against the ecosystem contract.
#[async_trait]
pub trait EcosystemPlugin: Send + Sync {
    /// Unique plugin name.
    fn name(&self) -> &str;

    /// Ordering stage.
    fn enforce(&self) -> Option<Enforce> {
        None
    }

    /// Activation condition; `None` means always active.
    fn apply(&self) -> Option<Apply> {
        None
    }

    /// `config(config, env)`: returns a partial foreign config.
    async fn config(&self, _config: &Value, _env: &ConfigEnv) -> LoomResult<Option<Value>> {
        Ok(None)
    }

    /// `configResolved(config)`.
    async fn config_resolved(&self, _config: &Value) -> LoomResult<()> {
        Ok(())
    }

    /// `configureServer(server)`.
    async fn configure_server(&self, _server: &Arc<CompatDevServer>) -> LoomResult<()> {
        Ok(())
    }

    /// `buildStart()`.
    async fn build_start(&self, _ctx: &EcosystemContext) -> LoomResult<()> {
        Ok(())
    }

    /// `resolveId(source, importer)`.
    async fn resolve_id(
        &self,
        _ctx: &EcosystemContext,
        _source: &str,
        _importer: Option<&str>,
    ) -> LoomResult<Option<ResolveIdOutput>> {
        Ok(None)
    }

    /// `load(id)`.
    async fn load(&self, _ctx: &EcosystemContext, _id: &str) -> LoomResult<Option<CodeOutput>> {
        Ok(None)
    }

    /// `transform(code, id)`.
    async fn transform(
        &self,
        _ctx: &EcosystemContext,
        _code: &str,
        _id: &str,
    ) -> LoomResult<Option<CodeOutput>> {
        Ok(None)
    }

    /// `buildEnd()`.
    async fn build_end(&self, _ctx: &EcosystemContext) -> LoomResult<()> {
        Ok(())
    }

    /// `closeBundle()`.
    async fn close_bundle(&self, _ctx: &EcosystemContext) -> LoomResult<()> {
        Ok(())
    }

    /// `handleHotUpdate(ctx)`: returns the affected module ids.
    async fn handle_hot_update(&self, _ctx: &HotUpdateContext) -> LoomResult<Option<Vec<String>>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::types::Mode;
    use serde_json::json;

    fn env(command: Command) -> ConfigEnv {
        ConfigEnv {
            mode: Mode::Development,
            command,
        }
    }

    #[test]
    fn test_apply_by_command_treats_preview_as_serve() {
        let apply = Apply::Command(Command::Serve);
        assert!(apply.evaluate(&json!({}), &env(Command::Serve)));
        assert!(apply.evaluate(&json!({}), &env(Command::Preview)));
        assert!(!apply.evaluate(&json!({}), &env(Command::Build)));
    }

    #[test]
    fn test_apply_predicate_sees_config() {
        let apply = Apply::Predicate(Arc::new(|config: &Value, _env: &ConfigEnv| {
            config["build"]["sourcemap"] == json!(true)
        }));
        assert!(apply.evaluate(&json!({ "build": { "sourcemap": true } }), &env(Command::Build)));
        assert!(!apply.evaluate(&json!({}), &env(Command::Build)));
    }

    #[test]
    fn test_resolve_id_output_forms() {
        let parsed: ResolveIdOutput = serde_json::from_value(json!({
            "id": "/src/App.vue?vue&type=style",
            "external": false,
            "moduleSideEffects": true
        }))
        .expect("object form");
        let result = parsed.into_resolve_result();
        assert_eq!(result.resolved_path, "/src/App.vue");
        assert_eq!(
            result.query,
            vec![
                ("vue".to_string(), String::new()),
                ("type".to_string(), "style".to_string())
            ]
        );
        assert!(result.side_effects);
        assert!(!result.external);
        assert!(result.meta.is_empty());

        let bare = ResolveIdOutput::Id("/virtual/x".to_string()).into_resolve_result();
        assert_eq!(bare.resolved_path, "/virtual/x");
        assert!(bare.query.is_empty());
    }

    #[test]
    fn test_code_output_serializes_object_maps() {
        let (code, map) = CodeOutput::Object {
            code: "x".to_string(),
            map: Some(json!({ "version": 3, "mappings": "" })),
        }
        .into_parts();
        assert_eq!(code, "x");
        assert!(map.is_some_and(|m| m.contains("\"version\":3")));

        let (_, map) = CodeOutput::Code("y".to_string()).into_parts();
        assert!(map.is_none());
    }
}
