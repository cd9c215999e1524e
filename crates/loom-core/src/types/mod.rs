//! Shared domain types.

pub mod hook;
pub mod mode;
pub mod module;
pub mod query;

pub use hook::{
    EmitFileParams, LoadParam, LoadResult, ResolveParam, ResolveResult, TransformParam,
    TransformResult, UpdateModulesParam,
};
pub use mode::{Command, ConfigEnv, Mode, ModuleFormat, TargetEnv};
pub use module::{ModuleInfo, ModuleType, ResolveKind, UpdateType};
pub use query::Query;
