//! Inline (command-line) options, the highest-precedence config layer.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use loom_core::config::UserConfig;
use loom_core::config::compilation::{UserCompilationConfig, UserOutputConfig};
use loom_core::config::server::{HmrOption, HttpsOption, UserPreviewConfig, UserServerConfig};
use loom_core::types::Mode;

/// Dev-server options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineServerOptions {
    /// Listening port.
    pub port: Option<u16>,
    /// Listening host.
    pub host: Option<String>,
    /// Serve over HTTPS.
    pub https: Option<bool>,
    /// Enable hot module replacement.
    pub hmr: Option<bool>,
    /// Fail when the port is taken.
    pub strict_port: Option<bool>,
    /// Open a browser on start.
    pub open: Option<bool>,
    /// Enable CORS.
    pub cors: Option<bool>,
}

/// Build options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineBuildOptions {
    /// Output directory.
    pub out_dir: Option<PathBuf>,
    /// Emit source maps.
    pub sourcemap: Option<bool>,
    /// Minify output.
    pub minify: Option<bool>,
}

/// Preview-server options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlinePreviewOptions {
    /// Listening port.
    pub port: Option<u16>,
    /// Listening host.
    pub host: Option<String>,
    /// Open a browser on start.
    pub open: Option<bool>,
    /// Fail when the port is taken.
    pub strict_port: Option<bool>,
    /// Directory to serve.
    pub dist_dir: Option<PathBuf>,
}

/// Options given directly to the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineConfig {
    /// Project root; defaults to the working directory.
    pub root: Option<PathBuf>,
    /// Compilation mode.
    pub mode: Option<Mode>,
    /// Explicit config file, relative to the root.
    pub config_path: Option<PathBuf>,
    /// Dev-server options.
    pub server: Option<InlineServerOptions>,
    /// Build options.
    pub build: Option<InlineBuildOptions>,
    /// Preview-server options.
    pub preview: Option<InlinePreviewOptions>,
    /// Environment used instead of the process environment.
    pub env: Option<BTreeMap<String, String>>,
}

impl InlineConfig {
    /// Produces the CLI config layer. Only set options appear in it.
    pub fn to_user_config(&self) -> UserConfig {
        let server = self.server.as_ref().map(|server| UserServerConfig {
            port: server.port,
            host: server.host.clone(),
            https: server.https.map(HttpsOption::Enabled),
            hmr: server.hmr.map(HmrOption::Enabled),
            strict_port: server.strict_port,
            open: server.open,
            cors: server.cors,
            proxy: None,
        });

        let compilation = self.build.as_ref().map(|build| UserCompilationConfig {
            output: build.out_dir.as_ref().map(|path| UserOutputConfig {
                path: Some(path.clone()),
                ..Default::default()
            }),
            sourcemap: build.sourcemap,
            minify: build.minify,
            ..Default::default()
        });

        let preview = self.preview.as_ref().map(|preview| UserPreviewConfig {
            port: preview.port,
            host: preview.host.clone(),
            open: preview.open,
            strict_port: preview.strict_port,
            dist_dir: preview.dist_dir.clone(),
        });

        UserConfig {
            root: self.root.clone(),
            mode: self.mode,
            compilation,
            server,
            preview,
            ..Default::default()
        }
    }
}
