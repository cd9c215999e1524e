//! Unified error types for loom.
//!
//! Every crate maps its internal errors into [`LoomError`] so they can
//! travel through the `?` operator up to the hook dispatcher's caller.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The config file could not be compiled, imported, or parsed.
    ConfigLoad,
    /// A foreign plugin used a context feature with no native equivalent.
    IncompatiblePlugin,
    /// No compilation entry could be configured or discovered.
    InputResolution,
    /// A plugin hook failed.
    Plugin,
    /// Two plugins in one registry share a name.
    DuplicatePlugin,
    /// A configuration value is invalid.
    Configuration,
    /// The native compiler collaborator reported a failure.
    Compiler,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A filesystem I/O error occurred.
    Io,
    /// A filter or external pattern is not a valid regular expression.
    InvalidPattern,
    /// An internal invariant was violated.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigLoad => write!(f, "CONFIG_LOAD"),
            Self::IncompatiblePlugin => write!(f, "INCOMPATIBLE_PLUGIN"),
            Self::InputResolution => write!(f, "INPUT_RESOLUTION"),
            Self::Plugin => write!(f, "PLUGIN"),
            Self::DuplicatePlugin => write!(f, "DUPLICATE_PLUGIN"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Compiler => write!(f, "COMPILER"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Io => write!(f, "IO"),
            Self::InvalidPattern => write!(f, "INVALID_PATTERN"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout loom.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct LoomError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LoomError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a config-load error.
    pub fn config_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigLoad, message)
    }

    /// Create the error raised when a foreign plugin touches an unsupported
    /// context feature.
    pub fn incompatible_plugin(
        plugin: &str,
        hook: &str,
        feature: &str,
        file: Option<&str>,
    ) -> Self {
        let mut message = format!(
            "plugin {plugin} is not compatible because hook {hook} called feature {feature}"
        );
        if let Some(file) = file {
            message.push_str(&format!(" (while processing {file})"));
        }
        Self::new(ErrorKind::IncompatiblePlugin, message)
    }

    /// Create an input-resolution error.
    pub fn input_resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputResolution, message)
    }

    /// Create a plugin error.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Plugin, message)
    }

    /// Create a duplicate-plugin error.
    pub fn duplicate_plugin(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicatePlugin,
            format!("Plugin '{name}' is already registered"),
        )
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a compiler error.
    pub fn compiler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Compiler, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns true when this error carries the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for LoomError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for LoomError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for LoomError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for LoomError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

impl From<regex::Error> for LoomError {
    fn from(err: regex::Error) -> Self {
        Self::with_source(
            ErrorKind::InvalidPattern,
            format!("Invalid pattern: {err}"),
            err,
        )
    }
}
