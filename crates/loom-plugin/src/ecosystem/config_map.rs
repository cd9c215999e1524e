//! Bidirectional translation between native and foreign config shapes.
//!
//! One table drives both directions. Each entry names a dotted path on
//! either side and a transform per direction; a transform returning `None`
//! drops the field.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value, json};

use loom_core::merge::{get_path, set_path};
use loom_core::types::Mode;

/// Per-field value transform.
pub type Transform = fn(&Value) -> Option<Value>;

/// One row of the mapping table.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    /// Dotted path in the native config.
    pub native: &'static str,
    /// Dotted path in the foreign config.
    pub foreign: &'static str,
    /// Native value to foreign value.
    pub forward: Transform,
    /// Foreign value to native value.
    pub inverse: Transform,
}

const fn narrowed(native: &'static str, foreign: &'static str, inverse: Transform) -> FieldMapping {
    FieldMapping {
        native,
        foreign,
        forward: identity,
        inverse,
    }
}

/// Every translated field.
pub const CONFIG_FIELD_MAP: &[FieldMapping] = &[
    narrowed("root", "root", string_only),
    narrowed("mode", "mode", mode_to_native),
    narrowed("publicDir", "publicDir", string_only),
    narrowed("envDir", "envDir", string_only),
    narrowed("envPrefix", "envPrefix", string_list_to_native),
    narrowed("compilation.output.publicPath", "base", string_only),
    narrowed("compilation.output.path", "build.outDir", string_only),
    narrowed("compilation.sourcemap", "build.sourcemap", flag_to_native),
    narrowed("compilation.minify", "build.minify", flag_to_native),
    narrowed("compilation.input", "build.rollupOptions.input", input_to_native),
    narrowed(
        "compilation.external",
        "build.rollupOptions.external",
        external_to_native,
    ),
    narrowed("compilation.define", "define", object_only),
    narrowed("compilation.resolve.alias", "resolve.alias", alias_to_native),
    narrowed(
        "compilation.resolve.extensions",
        "resolve.extensions",
        string_list_to_native,
    ),
    narrowed(
        "compilation.resolve.mainFields",
        "resolve.mainFields",
        string_list_to_native,
    ),
    narrowed(
        "compilation.resolve.conditions",
        "resolve.conditions",
        string_list_to_native,
    ),
    FieldMapping {
        native: "compilation.resolve.symlinks",
        foreign: "resolve.preserveSymlinks",
        forward: negate,
        inverse: negate,
    },
    narrowed("server.port", "server.port", port_to_native),
    narrowed("server.host", "server.host", host_to_native),
    narrowed("server.https", "server.https", https_to_native),
    narrowed("server.strictPort", "server.strictPort", bool_only),
    narrowed("server.open", "server.open", flag_to_native),
    narrowed("server.cors", "server.cors", flag_to_native),
    narrowed("server.proxy", "server.proxy", object_only),
    narrowed("server.hmr", "server.hmr", hmr_to_native),
];

/// Projects a native config tree onto the foreign shape.
pub fn to_foreign(native: &Value) -> Value {
    translate(native, |m| (m.native, m.foreign, m.forward))
}

/// Projects a foreign config tree back onto the native shape.
pub fn to_native(foreign: &Value) -> Value {
    translate(foreign, |m| (m.foreign, m.native, m.inverse))
}

fn translate<F>(source: &Value, direction: F) -> Value
where
    F: Fn(&FieldMapping) -> (&'static str, &'static str, Transform),
{
    let mut out = Value::Object(Map::new());
    for mapping in CONFIG_FIELD_MAP {
        let (from, to, transform) = direction(mapping);
        if let Some(value) = get_path(source, from).and_then(transform) {
            set_path(&mut out, to, value);
        }
    }
    out
}

fn identity(value: &Value) -> Option<Value> {
    Some(value.clone())
}

fn negate(value: &Value) -> Option<Value> {
    value.as_bool().map(|b| Value::Bool(!b))
}

fn string_only(value: &Value) -> Option<Value> {
    value.is_string().then(|| value.clone())
}

fn bool_only(value: &Value) -> Option<Value> {
    value.is_boolean().then(|| value.clone())
}

fn object_only(value: &Value) -> Option<Value> {
    value.is_object().then(|| value.clone())
}

/// Custom mode names have no native counterpart and are dropped.
fn mode_to_native(value: &Value) -> Option<Value> {
    let mode: Mode = value.as_str()?.parse().ok()?;
    Some(Value::from(mode.as_str()))
}

/// `string | string[]` becomes a list of strings.
fn string_list_to_native(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(Value::Array(vec![value.clone()])),
        Value::Array(items) => Some(Value::Array(
            items.iter().filter(|item| item.is_string()).cloned().collect(),
        )),
        _ => None,
    }
}

/// Any non-boolean switch form turns the feature on: `sourcemap: 'inline' |
/// 'hidden'`, `minify: 'terser' | 'esbuild'`, `open: '/path'`,
/// `cors: { ... }`.
fn flag_to_native(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(_) | Value::Object(_) => Some(Value::Bool(true)),
        _ => None,
    }
}

fn port_to_native(value: &Value) -> Option<Value> {
    let port = u16::try_from(value.as_u64()?).ok()?;
    Some(Value::from(port))
}

/// `host: true` listens on every interface, `host: false` on localhost.
fn host_to_native(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Bool(true) => Some(Value::from("0.0.0.0")),
        Value::Bool(false) => Some(Value::from("localhost")),
        _ => None,
    }
}

/// Certificate paths survive; other TLS option objects only switch HTTPS on.
fn https_to_native(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Object(options) => {
            match (
                options.get("key").and_then(Value::as_str),
                options.get("cert").and_then(Value::as_str),
            ) {
                (Some(key), Some(cert)) => Some(json!({ "key": key, "cert": cert })),
                _ => Some(Value::Bool(true)),
            }
        }
        _ => None,
    }
}

/// Keeps the HMR settings with a native field of the same type.
fn hmr_to_native(value: &Value) -> Option<Value> {
    let options = match value {
        Value::Bool(_) => return Some(value.clone()),
        Value::Object(options) => options,
        _ => return None,
    };

    let mut native = Map::new();
    if let Some(port) = options.get("port").and_then(port_to_native) {
        native.insert("port".to_string(), port);
    }
    for key in ["host", "protocol", "path"] {
        if let Some(text) = options.get(key).and_then(string_only) {
            native.insert(key.to_string(), text);
        }
    }
    if let Some(overlay) = options.get("overlay").and_then(bool_only) {
        native.insert("overlay".to_string(), overlay);
    }
    Some(Value::Object(native))
}

/// `alias: Record<string, string> | { find, replacement }[]` becomes a map.
/// Regex `find` entries are dropped.
fn alias_to_native(value: &Value) -> Option<Value> {
    let aliases: Map<String, Value> = match value {
        Value::Object(entries) => entries
            .iter()
            .filter(|(_, target)| target.is_string())
            .map(|(find, target)| (find.clone(), target.clone()))
            .collect(),
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| {
                let find = entry.get("find")?.as_str()?;
                let replacement = entry.get("replacement")?.as_str()?;
                Some((find.to_string(), Value::from(replacement)))
            })
            .collect(),
        _ => return None,
    };
    Some(Value::Object(aliases))
}

/// `input: string | string[] | Record<string, string>` becomes a name map.
fn input_to_native(value: &Value) -> Option<Value> {
    let entries: Vec<&str> = match value {
        Value::Object(_) => return Some(value.clone()),
        Value::String(entry) => vec![entry.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return None,
    };

    let mut named = BTreeMap::new();
    for entry in entries {
        let stem = Path::new(entry)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("index")
            .to_string();
        let mut name = stem.clone();
        let mut suffix = 1;
        while named.contains_key(&name) {
            name = format!("{stem}_{suffix}");
            suffix += 1;
        }
        named.insert(name, Value::String(entry.to_string()));
    }
    Some(Value::Object(named.into_iter().collect()))
}

/// `external: string | (string | RegExp)[]` keeps the string patterns.
fn external_to_native(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(Value::Array(vec![value.clone()])),
        Value::Array(items) => Some(Value::Array(
            items.iter().filter(|item| item.is_string()).cloned().collect(),
        )),
        _ => None,
    }
}
