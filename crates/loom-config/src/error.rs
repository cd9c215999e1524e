//! Errors raised while loading and resolving configuration.
//!
//! Every variant maps onto a [`LoomError`] kind so callers only ever deal
//! with the unified error.

use std::path::PathBuf;

use loom_core::error::{ErrorKind, LoomError};
use loom_core::types::Mode;
use thiserror::Error;

/// Error type for config resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be compiled or evaluated.
    #[error("Failed to load config file {path}: {reason}")]
    LoadFailed {
        /// Config file.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
        /// Remediation hints shown to the user.
        hints: Vec<String>,
        /// Whether the process should stop.
        fatal: bool,
    },

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {path}")]
    ExplicitConfigMissing {
        /// The requested path.
        path: PathBuf,
    },

    /// No entry was configured and none could be found.
    #[error("No entry found in {root}; tried {}", candidates.join(", "))]
    NoEntry {
        /// Project root searched.
        root: PathBuf,
        /// Candidate entry files tried, in order.
        candidates: Vec<String>,
    },

    /// The config file extension is not recognized.
    #[error("Unsupported config file format: {path}")]
    UnsupportedConfigFormat {
        /// Config file.
        path: PathBuf,
    },

    /// A script config file was found but nothing can evaluate it.
    #[error("No config module evaluator is available for {path}")]
    EvaluatorUnavailable {
        /// Config file.
        path: PathBuf,
    },
}

/// Remediation hints attached to a non-fatal config load failure.
pub const LOAD_FAILURE_HINTS: [&str; 2] = [
    "set LOOM_CONFIG_FORMAT=cjs (or esm) to compile the config file in the other module format",
    "set LOOM_CONFIG_FULL_BUNDLE=true to bundle node_modules dependencies into the compiled config",
];

impl ConfigError {
    /// Builds a load failure. Fatal in production; otherwise carries the
    /// remediation hints.
    pub fn load_failed(path: impl Into<PathBuf>, reason: impl Into<String>, mode: Mode) -> Self {
        let fatal = mode.is_production();
        let hints = if fatal {
            Vec::new()
        } else {
            LOAD_FAILURE_HINTS.iter().map(|hint| hint.to_string()).collect()
        };
        Self::LoadFailed {
            path: path.into(),
            reason: reason.into(),
            hints,
            fatal,
        }
    }

    /// Returns whether this error should end the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LoadFailed { fatal: true, .. })
    }
}

impl From<ConfigError> for LoomError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::NoEntry { .. } => LoomError::input_resolution(err.to_string()),
            ConfigError::LoadFailed { hints, .. } if !hints.is_empty() => {
                let mut message = err.to_string();
                for hint in hints {
                    message.push_str("\n  hint: ");
                    message.push_str(hint);
                }
                LoomError::new(ErrorKind::ConfigLoad, message)
            }
            _ => LoomError::config_load(err.to_string()),
        }
    }
}
