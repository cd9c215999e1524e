//! Compile-time `define` replacements.

use std::collections::BTreeMap;

use serde_json::Value;

use loom_core::config::ResolvedConfig;

/// Injects `process.env.*` defines under the user's own.
///
/// `NODE_ENV` and `mode` carry the resolved mode; every exposed env
/// variable becomes `process.env.<KEY>`. User defines win on conflict.
pub fn normalize_define(config: &mut ResolvedConfig) {
    let mode = Value::String(config.mode.as_str().to_string());
    let mut define = BTreeMap::from([
        ("process.env.NODE_ENV".to_string(), mode.clone()),
        ("process.env.mode".to_string(), mode),
    ]);
    for (key, value) in &config.env {
        define.insert(format!("process.env.{key}"), Value::String(value.clone()));
    }

    define.extend(std::mem::take(&mut config.compilation.define));
    config.compilation.define = define;
}
