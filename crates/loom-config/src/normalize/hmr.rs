//! HMR connection settings and client injection.

use serde_json::Value;
use tracing::debug;

use loom_core::config::env::EnvOverrides;
use loom_core::config::resolved::ResolvedHmr;
use loom_core::config::server::HmrConfig;
use loom_core::config::{DEFAULT_SERVER_PORT, ResolvedConfig, UserConfig};

use super::runtime::{HMR_PLUGIN, push_unique, runtime_dir};

/// Default HMR socket path.
pub const DEFAULT_HMR_PATH: &str = "/__hmr";

/// Resolves `server.hmr` and injects the HMR client when it applies.
///
/// Connection settings exist only for `serve` with a truthy `hmr`. The
/// client plugin and the `LOOM_HMR_*` defines are injected only when, in
/// addition, the target is not node and some entry is an HTML file.
pub fn normalize_hmr(config: &mut ResolvedConfig, user: &UserConfig, overrides: &EnvOverrides) {
    let server = user.server().cloned().unwrap_or_default();
    let enabled = config.command.is_serve()
        && server.hmr.as_ref().is_some_and(|hmr| hmr.is_enabled());
    if !enabled {
        config.server.hmr = None;
        return;
    }

    let options = server
        .hmr
        .as_ref()
        .and_then(|hmr| hmr.config())
        .cloned()
        .unwrap_or_default();
    let hmr = resolve_hmr(&options, server.port, server.host.as_deref(), config, overrides);

    let inject = !config.compilation.output.target_env.is_node() && config.has_html_input();
    debug!(inject, port = hmr.port, "HMR enabled");
    if inject {
        let plugin = runtime_dir(&config.root, user).join(HMR_PLUGIN);
        push_unique(&mut config.compilation.runtime.plugins, plugin);

        let define = &mut config.compilation.define;
        define.insert("LOOM_HMR_PORT".to_string(), Value::from(hmr.port));
        define.insert("LOOM_HMR_HOST".to_string(), Value::from(hmr.host.clone()));
        define.insert(
            "LOOM_HMR_PROTOCOL".to_string(),
            Value::from(hmr.protocol.clone()),
        );
        define.insert("LOOM_HMR_PATH".to_string(), Value::from(hmr.path.clone()));
    }
    config.server.hmr = Some(hmr);
}

fn resolve_hmr(
    options: &HmrConfig,
    server_port: Option<u16>,
    server_host: Option<&str>,
    config: &ResolvedConfig,
    overrides: &EnvOverrides,
) -> ResolvedHmr {
    let https = config.server.https.is_some();
    ResolvedHmr {
        port: options
            .port
            .or(server_port)
            .or(overrides.default_hmr_port)
            .unwrap_or(DEFAULT_SERVER_PORT),
        host: options
            .host
            .clone()
            .or_else(|| server_host.map(str::to_string))
            .unwrap_or_else(|| "localhost".to_string()),
        protocol: options
            .protocol
            .clone()
            .unwrap_or_else(|| if https { "wss" } else { "ws" }.to_string()),
        path: options
            .path
            .clone()
            .unwrap_or_else(|| DEFAULT_HMR_PATH.to_string()),
        overlay: options.overlay.unwrap_or(true),
    }
}
