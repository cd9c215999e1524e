//! Dev-server and preview-server settings.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dev-server settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserServerConfig {
    /// Listening port.
    pub port: Option<u16>,
    /// Listening host.
    pub host: Option<String>,
    /// HTTPS switch or certificate paths.
    pub https: Option<HttpsOption>,
    /// HMR switch or settings.
    pub hmr: Option<HmrOption>,
    /// Fail instead of trying the next port when the port is taken.
    pub strict_port: Option<bool>,
    /// Open a browser on start.
    pub open: Option<bool>,
    /// Enable CORS.
    pub cors: Option<bool>,
    /// Path prefix → proxy options.
    pub proxy: Option<BTreeMap<String, Value>>,
}

/// `https: true | false | { key, cert }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HttpsOption {
    /// Switch (self-signed when enabled).
    Enabled(bool),
    /// Certificate files.
    Certificates(HttpsCertificates),
}

impl HttpsOption {
    /// Returns whether HTTPS is on.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Certificates(_) => true,
        }
    }
}

/// TLS certificate files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpsCertificates {
    /// Private key file.
    pub key: PathBuf,
    /// Certificate file.
    pub cert: PathBuf,
}

/// `hmr: true | false | { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HmrOption {
    /// Switch with default settings.
    Enabled(bool),
    /// Explicit settings (enabled).
    Config(HmrConfig),
}

impl HmrOption {
    /// Returns whether HMR is on.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Config(_) => true,
        }
    }

    /// Returns the explicit settings, if any.
    pub fn config(&self) -> Option<&HmrConfig> {
        match self {
            Self::Enabled(_) => None,
            Self::Config(config) => Some(config),
        }
    }
}

/// Explicit HMR settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HmrConfig {
    /// HMR socket port.
    pub port: Option<u16>,
    /// HMR socket host.
    pub host: Option<String>,
    /// `ws` or `wss`.
    pub protocol: Option<String>,
    /// HMR socket path.
    pub path: Option<String>,
    /// Show the error overlay.
    pub overlay: Option<bool>,
}

/// Preview-server settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreviewConfig {
    /// Listening port.
    pub port: Option<u16>,
    /// Listening host.
    pub host: Option<String>,
    /// Open a browser on start.
    pub open: Option<bool>,
    /// Fail instead of trying the next port when the port is taken.
    pub strict_port: Option<bool>,
    /// Directory served (defaults to the output path).
    pub dist_dir: Option<PathBuf>,
}
