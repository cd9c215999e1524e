//! # loom-config
//!
//! Config resolution for loom:
//!
//! - Inline (command-line) options
//! - Config file discovery, with stage-0 compilation of script files
//! - Layer merging and the native `config` / `configResolved` hooks
//! - The fixed-order normalization pipeline

pub mod bootstrap;
pub mod error;
pub mod inline;
pub mod loader;
pub mod normalize;
pub mod resolver;

pub use bootstrap::{ConfigBootstrap, ConfigModule, ConfigModuleEvaluator};
pub use error::ConfigError;
pub use inline::InlineConfig;
pub use loader::{CONFIG_FILE_NAMES, ConfigFileLoader, find_config_file};
pub use resolver::{ConfigResolver, ResolvedConfigSession};
