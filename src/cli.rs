//! Command-line surface of the `loom` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use loom_config::inline::{
    InlineBuildOptions, InlineConfig, InlinePreviewOptions, InlineServerOptions,
};
use loom_config::ConfigResolver;
use loom_core::LoomResult;
use loom_core::config::LoggingConfig;
use loom_core::config::env::EnvOverrides;
use loom_core::types::{Command, Mode};

/// loom: plugin-driven web build tool
#[derive(Debug, Parser)]
#[command(name = "loom", version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log format
    #[arg(long, global = true, default_value = "pretty", value_parser = ["pretty", "json"])]
    pub log_format: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the config for the dev server
    Dev(CommonArgs),
    /// Resolve the config for a production build
    Build(CommonArgs),
    /// Resolve the config for the preview server
    Preview(CommonArgs),
}

/// Options shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Compilation mode (development or production)
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Config file, relative to the root
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Server host
    #[arg(long)]
    pub host: Option<String>,

    /// Serve over HTTPS
    #[arg(long)]
    pub https: bool,

    /// Disable hot module replacement
    #[arg(long)]
    pub no_hmr: bool,

    /// Fail if the port is already in use
    #[arg(long)]
    pub strict_port: bool,

    /// Open a browser on start
    #[arg(long)]
    pub open: bool,

    /// Enable CORS
    #[arg(long)]
    pub cors: bool,

    /// Output directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Emit source maps
    #[arg(long)]
    pub sourcemap: bool,

    /// Minify output
    #[arg(long)]
    pub minify: bool,
}

/// Unset flags stay `None` so lower config layers are not overridden.
fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

impl CommonArgs {
    /// Builds the inline config for `command`.
    pub fn to_inline(&self, command: Command) -> InlineConfig {
        let mut inline = InlineConfig {
            root: self.root.clone(),
            mode: self.mode,
            config_path: self.config.clone(),
            build: Some(InlineBuildOptions {
                out_dir: self.out_dir.clone(),
                sourcemap: flag(self.sourcemap),
                minify: flag(self.minify),
            }),
            ..Default::default()
        };

        match command {
            Command::Preview => {
                inline.preview = Some(InlinePreviewOptions {
                    port: self.port,
                    host: self.host.clone(),
                    open: flag(self.open),
                    strict_port: flag(self.strict_port),
                    dist_dir: self.out_dir.clone(),
                });
            }
            Command::Serve | Command::Build => {
                inline.server = Some(InlineServerOptions {
                    port: self.port,
                    host: self.host.clone(),
                    https: flag(self.https),
                    hmr: self.no_hmr.then_some(false),
                    strict_port: flag(self.strict_port),
                    open: flag(self.open),
                    cors: flag(self.cors),
                });
            }
        }
        inline
    }
}

impl Cli {
    /// Logging settings taken from the global flags.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }

    /// Command and options of the chosen subcommand.
    pub fn target(&self) -> (Command, &CommonArgs) {
        match &self.command {
            Commands::Dev(args) => (Command::Serve, args),
            Commands::Build(args) => (Command::Build, args),
            Commands::Preview(args) => (Command::Preview, args),
        }
    }

    /// Resolves the config and prints it as JSON.
    pub async fn execute(&self) -> LoomResult<()> {
        let (command, args) = self.target();
        let overrides = EnvOverrides::load()?;
        let session = ConfigResolver::new(command, overrides)
            .resolve(&args.to_inline(command))
            .await?;

        let json = serde_json::to_string_pretty(session.config.as_ref())?;
        println!("{json}");
        Ok(())
    }
}
