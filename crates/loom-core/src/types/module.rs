//! Module-level types shared by hooks and the compiler boundary.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Type of a loaded module, inferred from its extension or query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    /// JavaScript.
    Js,
    /// JavaScript with JSX.
    Jsx,
    /// TypeScript.
    Ts,
    /// TypeScript with JSX.
    Tsx,
    /// CSS.
    Css,
    /// HTML.
    Html,
    /// JSON.
    Json,
    /// A static asset.
    Asset,
    /// Anything else, keyed by its extension.
    Custom(String),
}

impl ModuleType {
    /// Maps a file extension (without the dot) to a module type.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Self::Js,
            "jsx" => Self::Jsx,
            "ts" | "mts" | "cts" => Self::Ts,
            "tsx" => Self::Tsx,
            "css" => Self::Css,
            "html" | "htm" => Self::Html,
            "json" => Self::Json,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "woff" | "woff2" | "ttf" => {
                Self::Asset
            }
            other => Self::Custom(other.to_string()),
        }
    }

    /// Infers the module type of a resolved path and its query.
    ///
    /// A `lang.<ext>` flag or a `lang=<ext>` pair in the query wins over the
    /// path's own extension. Paths without an extension are treated as JS.
    pub fn infer(resolved_path: &str, query: &[(String, String)]) -> Self {
        for (key, value) in query {
            if let Some(ext) = key.strip_prefix("lang.") {
                return Self::from_extension(ext);
            }
            if key == "lang" && !value.is_empty() {
                return Self::from_extension(value);
            }
        }

        match Path::new(resolved_path).extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_extension(ext),
            None => Self::Js,
        }
    }

    /// Returns the string name used in filters (`js`, `css`, `vue`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Js => "js",
            Self::Jsx => "jsx",
            Self::Ts => "ts",
            Self::Tsx => "tsx",
            Self::Css => "css",
            Self::Html => "html",
            Self::Json => "json",
            Self::Asset => "asset",
            Self::Custom(ext) => ext,
        }
    }

    /// Returns whether this is a script module.
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Js | Self::Jsx | Self::Ts | Self::Tsx)
    }
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a module is being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolveKind {
    /// A compilation entry, keyed by its entry name.
    Entry(String),
    /// A static `import`.
    Import,
    /// A dynamic `import()`.
    DynamicImport,
    /// A `require()` call.
    Require,
    /// A CSS `@import`.
    CssAtImport,
    /// A CSS `url()`.
    CssUrl,
    /// An HTML `<script src>`.
    ScriptSrc,
    /// An HTML `<link href>`.
    LinkHref,
    /// A module re-resolved during a hot update.
    HmrUpdate,
    /// Anything else.
    Custom(String),
}

impl Default for ResolveKind {
    fn default() -> Self {
        Self::Import
    }
}

/// Kind of change reported for a file during a hot update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    /// File was created.
    Added,
    /// File content changed.
    Updated,
    /// File was deleted.
    Removed,
}

/// The compiler's record of one module, as reported by a module-graph query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    /// Module id (resolved path plus query, relative to root).
    pub id: String,
    /// Absolute file the module was loaded from.
    pub file: String,
    /// Module type.
    pub module_type: ModuleType,
    /// Ids of modules importing this one.
    #[serde(default)]
    pub importers: Vec<String>,
    /// Ids of modules this one imports.
    #[serde(default)]
    pub imported: Vec<String>,
}
