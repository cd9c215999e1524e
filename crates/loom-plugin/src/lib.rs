//! # loom-plugin
//!
//! Plugin layer for loom. Provides:
//!
//! - The native `Plugin` trait with enforce-stage priorities
//! - Per-hook request filters
//! - The plugin registry (stable priority sort, implicit external plugin)
//! - The hook dispatcher with first-match, fail-fast, and union semantics
//! - A read-only module-graph shadow for hot updates
//! - The ecosystem adapter for plugins written against the foreign contract

pub mod ecosystem;
pub mod external;
pub mod graph;
pub mod hooks;
pub mod plugin;
pub mod prelude;
pub mod registry;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use ecosystem::{EcosystemAdapter, EcosystemPlugin};
pub use external::ExternalModulePlugin;
pub use graph::{ModuleGraphShadow, ShadowModuleNode};
pub use hooks::definitions::{HookCombination, HookKind};
pub use hooks::dispatcher::HookDispatcher;
pub use hooks::filter::{HookFilter, HookFilters, PatternSet};
pub use plugin::{DEFAULT_PRIORITY, Enforce, Plugin, PluginEntry};
pub use registry::{PluginDescriptor, PluginRegistry};
