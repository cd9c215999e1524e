//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use loom_core::traits::{CompilerContext, DevServer};
pub use loom_core::types::{
    LoadParam, LoadResult, ModuleType, ResolveParam, ResolveResult, TransformParam,
    TransformResult, UpdateModulesParam,
};
pub use loom_core::{LoomError, LoomResult};

pub use crate::ecosystem::{
    Apply, CodeOutput, EcosystemContext, EcosystemPlugin, HotUpdateContext, ResolveIdOutput,
};
pub use crate::hooks::filter::{HookFilter, HookFilters};
pub use crate::plugin::{Enforce, Plugin, PluginEntry, priority_of};
