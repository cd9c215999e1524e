//! Parameters and results of the native hook contract.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::module::{ModuleType, ResolveKind, UpdateType};
use super::query::Query;

/// Input of the `resolve` hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveParam {
    /// The specifier being resolved.
    pub source: String,
    /// Module id of the importer, if any.
    pub importer: Option<String>,
    /// Why the specifier is being resolved.
    #[serde(default)]
    pub kind: ResolveKind,
}

impl ResolveParam {
    /// Creates an import resolve request.
    pub fn new(source: impl Into<String>, importer: Option<&str>) -> Self {
        Self {
            source: source.into(),
            importer: importer.map(str::to_string),
            kind: ResolveKind::Import,
        }
    }
}

/// Output of the `resolve` hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResult {
    /// Resolved path without its query.
    pub resolved_path: String,
    /// Query parsed off the resolved id.
    #[serde(default)]
    pub query: Query,
    /// Whether the module has side effects.
    #[serde(default)]
    pub side_effects: bool,
    /// Whether the module is left out of the bundle.
    #[serde(default)]
    pub external: bool,
    /// Free-form metadata carried to later hooks.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Input of the `load` hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadParam {
    /// Resolved path without its query.
    pub resolved_path: String,
    /// Query of the resolved id.
    #[serde(default)]
    pub query: Query,
    /// Module id.
    pub module_id: String,
    /// Metadata produced by `resolve`.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl LoadParam {
    /// Creates a load request with no query or metadata.
    pub fn new(resolved_path: impl Into<String>) -> Self {
        let resolved_path = resolved_path.into();
        Self {
            module_id: resolved_path.clone(),
            resolved_path,
            query: Vec::new(),
            meta: BTreeMap::new(),
        }
    }
}

/// Output of the `load` hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    /// Module source.
    pub content: String,
    /// Module type.
    pub module_type: ModuleType,
    /// Serialized source map, if any.
    pub source_map: Option<String>,
}

/// Input of the `transform` hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformParam {
    /// Resolved path without its query.
    pub resolved_path: String,
    /// Query of the resolved id.
    #[serde(default)]
    pub query: Query,
    /// Module id.
    pub module_id: String,
    /// Current module type.
    pub module_type: ModuleType,
    /// Current module source.
    pub content: String,
    /// Source maps produced by earlier stages.
    #[serde(default)]
    pub source_map_chain: Vec<String>,
    /// Metadata produced by `resolve`.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl TransformParam {
    /// Creates a transform request with no query, metadata, or maps.
    pub fn new(
        resolved_path: impl Into<String>,
        module_type: ModuleType,
        content: impl Into<String>,
    ) -> Self {
        let resolved_path = resolved_path.into();
        Self {
            module_id: resolved_path.clone(),
            resolved_path,
            query: Vec::new(),
            module_type,
            content: content.into(),
            source_map_chain: Vec::new(),
            meta: BTreeMap::new(),
        }
    }
}

/// Output of the `transform` hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Transformed source.
    pub content: String,
    /// New module type, if the transform changed it.
    pub module_type: Option<ModuleType>,
    /// Serialized source map, if any.
    pub source_map: Option<String>,
    /// Whether earlier maps in the chain should be dropped.
    #[serde(default)]
    pub ignore_previous_source_map: bool,
}

/// Input of the `updateModules` hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateModulesParam {
    /// Changed files and the kind of change.
    pub paths: Vec<(String, UpdateType)>,
}

impl UpdateModulesParam {
    /// Returns the changed file paths.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|(path, _)| path.as_str())
    }
}

/// An asset emitted from a hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitFileParams {
    /// Module the asset is attributed to.
    pub resolved_path: String,
    /// Output file name.
    pub name: String,
    /// Raw bytes.
    pub content: Vec<u8>,
    /// Resource type (usually the extension).
    pub resource_type: String,
}
