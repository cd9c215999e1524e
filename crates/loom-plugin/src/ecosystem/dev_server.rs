//! Dev-server and hot-update views handed to ecosystem hooks.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;

use loom_core::traits::{CompilerContext, DevServer};
use loom_core::{LoomError, LoomResult};

use crate::graph::{ModuleGraphShadow, ShadowModuleNode};

/// Module-graph queries over the running compiler.
///
/// Modules returned by a file query are remembered so they can be looked
/// up by id afterwards.
pub struct CompatModuleGraph {
    compiler: Arc<dyn CompilerContext>,
    seen: DashMap<String, ShadowModuleNode>,
}

impl CompatModuleGraph {
    /// Creates a graph view over `compiler`.
    pub fn new(compiler: Arc<dyn CompilerContext>) -> Self {
        Self {
            compiler,
            seen: DashMap::new(),
        }
    }

    /// `moduleGraph.getModulesByFile(file)`.
    pub async fn get_modules_by_file(&self, file: &str) -> LoomResult<Vec<ShadowModuleNode>> {
        let shadow = ModuleGraphShadow::build(self.compiler.as_ref(), [file]).await?;
        let nodes = shadow.modules_by_file(file).to_vec();
        self.record(&nodes);
        Ok(nodes)
    }

    /// `moduleGraph.getModuleById(id)`.
    pub fn get_module_by_id(&self, id: &str) -> Option<ShadowModuleNode> {
        self.seen.get(id).map(|node| node.value().clone())
    }

    pub(crate) fn record(&self, nodes: &[ShadowModuleNode]) {
        for node in nodes {
            self.seen.insert(node.id.clone(), node.clone());
        }
    }
}

impl std::fmt::Debug for CompatModuleGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatModuleGraph")
            .field("seen", &self.seen.len())
            .finish()
    }
}

/// The dev server as seen by `configureServer` and `handleHotUpdate`.
pub struct CompatDevServer {
    config: Value,
    server: Arc<dyn DevServer>,
    module_graph: CompatModuleGraph,
}

impl CompatDevServer {
    /// Wraps `server`, exposing `config` as the foreign config view.
    pub fn new(server: Arc<dyn DevServer>, config: Value) -> Self {
        let module_graph = CompatModuleGraph::new(server.compiler_context());
        Self {
            config,
            server,
            module_graph,
        }
    }

    /// `server.config`.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.server.root()
    }

    /// Listening port.
    pub fn port(&self) -> u16 {
        self.server.port()
    }

    /// `server.moduleGraph`.
    pub fn module_graph(&self) -> &CompatModuleGraph {
        &self.module_graph
    }
}

impl std::fmt::Debug for CompatDevServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatDevServer")
            .field("root", &self.server.root())
            .field("port", &self.server.port())
            .finish()
    }
}

/// Argument of `handleHotUpdate`.
#[derive(Debug)]
pub struct HotUpdateContext {
    /// Changed file.
    pub file: String,
    /// Change time, in milliseconds since the epoch.
    pub timestamp: i64,
    /// Modules loaded from the file.
    pub modules: Vec<ShadowModuleNode>,
    /// The dev server, once `configureServer` has run.
    pub server: Option<Arc<CompatDevServer>>,
    content: OnceCell<String>,
}

impl HotUpdateContext {
    /// Creates the context for one changed file.
    pub fn new(
        file: impl Into<String>,
        modules: Vec<ShadowModuleNode>,
        server: Option<Arc<CompatDevServer>>,
    ) -> Self {
        Self {
            file: file.into(),
            timestamp: Utc::now().timestamp_millis(),
            modules,
            server,
            content: OnceCell::new(),
        }
    }

    /// Reads the file. The first read is cached.
    pub async fn read(&self) -> LoomResult<&str> {
        self.content
            .get_or_try_init(|| async {
                tokio::fs::read_to_string(&self.file)
                    .await
                    .map_err(LoomError::from)
            })
            .await
            .map(String::as_str)
    }

    /// Ids of the modules loaded from the file.
    pub fn module_ids(&self) -> Vec<String> {
        self.modules.iter().map(|node| node.id.clone()).collect()
    }
}
