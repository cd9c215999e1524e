//! Compatibility layer for plugins written against the ecosystem contract.
//!
//! Each ecosystem plugin is wrapped in one [`EcosystemAdapter`] that
//! translates its hooks, results, and config onto the native model.

pub mod adapter;
pub mod config_map;
pub mod context;
pub mod dev_server;
pub mod plugin;

pub use adapter::EcosystemAdapter;
pub use context::{CompatCache, ContextArena, EcosystemContext, EmittedAsset, ResolvedId};
pub use dev_server::{CompatDevServer, CompatModuleGraph, HotUpdateContext};
pub use plugin::{Apply, ApplyPredicate, CodeOutput, EcosystemPlugin, ResolveIdOutput};
