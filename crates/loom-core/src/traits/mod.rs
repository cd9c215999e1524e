//! Collaborator traits.
//!
//! The native compiler, dev server, and config-module runtime live outside
//! this workspace. loom only consumes them through these traits.

pub mod bootstrap;
pub mod compiler;
pub mod dev_server;

pub use bootstrap::{ConfigExport, ConfigFactory, ModuleCompiler};
pub use compiler::CompilerContext;
pub use dev_server::DevServer;
