//! The native compiler boundary seen from inside a hook.

use async_trait::async_trait;

use crate::result::LoomResult;
use crate::types::{EmitFileParams, ModuleInfo, ResolveParam, ResolveResult};

/// Capabilities the native compiler exposes to hooks.
///
/// Implementations must tolerate concurrent calls for different files.
#[async_trait]
pub trait CompilerContext: Send + Sync {
    /// Runs resolution through the compiler's own resolve pipeline.
    ///
    /// `caller` names the plugin asking, so it can be skipped and not
    /// re-entered.
    async fn resolve(
        &self,
        param: &ResolveParam,
        caller: Option<&str>,
    ) -> LoomResult<Option<ResolveResult>>;

    /// Makes `current` rebuild whenever `target` changes.
    async fn add_watch_file(&self, current: &str, target: &str) -> LoomResult<()>;

    /// Emits an asset into the output.
    async fn emit_file(&self, params: EmitFileParams) -> LoomResult<()>;

    /// Returns every module loaded from `file`.
    async fn modules_by_file(&self, file: &str) -> LoomResult<Vec<ModuleInfo>>;
}
