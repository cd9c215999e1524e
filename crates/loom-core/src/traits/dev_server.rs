//! The dev-server boundary handed to `configureDevServer`.

use std::path::Path;
use std::sync::Arc;

use super::compiler::CompilerContext;

/// A running dev server.
pub trait DevServer: Send + Sync {
    /// Project root the server serves.
    fn root(&self) -> &Path;

    /// Port the server listens on.
    fn port(&self) -> u16;

    /// Compiler driving the server, used for module-graph queries.
    fn compiler_context(&self) -> Arc<dyn CompilerContext>;
}
