//! Build mode, command, and target environment enums.

use serde::{Deserialize, Serialize};

/// Compilation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development mode (dev server, HMR, lazy compilation).
    #[default]
    Development,
    /// Production mode (tree shaking, minification).
    Production,
}

impl Mode {
    /// Returns the string name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Returns whether this is production mode.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// The command the tool was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Start the dev server.
    Serve,
    /// Produce a production build.
    Build,
    /// Serve a previously built output directory.
    Preview,
}

impl Command {
    /// Mode used when neither the CLI nor the config file sets one.
    pub fn default_mode(&self) -> Mode {
        match self {
            Self::Serve => Mode::Development,
            Self::Build | Self::Preview => Mode::Production,
        }
    }

    /// Command name as seen by ecosystem plugins (`serve` or `build`).
    pub fn foreign_name(&self) -> &'static str {
        match self {
            Self::Serve | Self::Preview => "serve",
            Self::Build => "build",
        }
    }

    /// Returns whether this command runs a dev server.
    pub fn is_serve(&self) -> bool {
        matches!(self, Self::Serve)
    }
}

/// Environment passed to functional config exports and `apply` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEnv {
    /// Resolved mode.
    pub mode: Mode,
    /// Command being run.
    pub command: Command,
}

/// Where the compiled output is meant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEnv {
    /// Browsers.
    #[default]
    Browser,
    /// Node.js.
    Node,
}

impl TargetEnv {
    /// Returns whether this targets node.
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node)
    }
}

/// Output module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// ECMAScript modules.
    #[default]
    Esm,
    /// CommonJS.
    Cjs,
}

impl ModuleFormat {
    /// File extension for a compiled config bundle in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Esm => "mjs",
            Self::Cjs => "cjs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_default_mode() {
        assert_eq!(Command::Serve.default_mode(), Mode::Development);
        assert_eq!(Command::Build.default_mode(), Mode::Production);
        assert_eq!(Command::Preview.default_mode(), Mode::Production);
    }

    #[test]
    fn test_foreign_command_names() {
        assert_eq!(Command::Serve.foreign_name(), "serve");
        assert_eq!(Command::Preview.foreign_name(), "serve");
        assert_eq!(Command::Build.foreign_name(), "build");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("prod".parse::<Mode>(), Ok(Mode::Production));
        assert_eq!("development".parse::<Mode>(), Ok(Mode::Development));
        assert!("staging".parse::<Mode>().is_err());
    }
}
