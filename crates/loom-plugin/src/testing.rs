//! In-memory stand-ins for the native compiler and dev server.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream test suites.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use loom_core::config::{DEFAULT_SERVER_PORT, ResolvedConfig};
use loom_core::traits::{CompilerContext, DevServer, ModuleCompiler};
use loom_core::types::query::split_query;
use loom_core::types::{EmitFileParams, ModuleInfo, ModuleType, ResolveParam, ResolveResult};
use loom_core::{LoomError, LoomResult};

/// Builds a module record, inferring its type from the id.
pub fn module_info(id: &str, file: &str) -> ModuleInfo {
    let (path, query) = split_query(id);
    ModuleInfo {
        id: id.to_string(),
        file: file.to_string(),
        module_type: ModuleType::infer(&path, &query),
        importers: Vec::new(),
        imported: Vec::new(),
    }
}

#[derive(Debug, Default)]
struct MockState {
    root: PathBuf,
    port: u16,
    resolutions: Mutex<HashMap<String, ResolveResult>>,
    modules: Mutex<Vec<ModuleInfo>>,
    resolve_calls: Mutex<Vec<(String, Option<String>)>>,
    watch_files: Mutex<Vec<(String, String)>>,
    emitted: Mutex<Vec<EmitFileParams>>,
    compiled: Mutex<Vec<ResolvedConfig>>,
    compile_error: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Mock compiler recording every call made through it.
///
/// Clones share state, so a test can keep one handle while handing
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct MockCompiler {
    inner: Arc<MockState>,
}

impl MockCompiler {
    /// Creates a mock rooted at `root`, listening on the default port.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(MockState {
                root: root.into(),
                port: DEFAULT_SERVER_PORT,
                ..Default::default()
            }),
        }
    }

    /// Returns this mock as a shared compiler context.
    pub fn context(&self) -> Arc<dyn CompilerContext> {
        Arc::new(self.clone())
    }

    /// Answers `resolve` for `source` with `result`.
    pub fn add_resolution(&self, source: &str, result: ResolveResult) {
        lock(&self.inner.resolutions).insert(source.to_string(), result);
    }

    /// Adds a module to the mock graph.
    pub fn add_module(&self, info: ModuleInfo) {
        lock(&self.inner.modules).push(info);
    }

    /// Makes every later `compile` fail with `message`.
    pub fn fail_compile(&self, message: &str) {
        *lock(&self.inner.compile_error) = Some(message.to_string());
    }

    /// Recorded `(source, caller)` pairs of `resolve` calls.
    pub fn resolve_calls(&self) -> Vec<(String, Option<String>)> {
        lock(&self.inner.resolve_calls).clone()
    }

    /// Recorded `(current, target)` pairs of `add_watch_file` calls.
    pub fn watch_files(&self) -> Vec<(String, String)> {
        lock(&self.inner.watch_files).clone()
    }

    /// Recorded emitted assets.
    pub fn emitted_files(&self) -> Vec<EmitFileParams> {
        lock(&self.inner.emitted).clone()
    }

    /// Configs `compile` was called with.
    pub fn compiled_configs(&self) -> Vec<ResolvedConfig> {
        lock(&self.inner.compiled).clone()
    }
}

#[async_trait]
impl CompilerContext for MockCompiler {
    async fn resolve(
        &self,
        param: &ResolveParam,
        caller: Option<&str>,
    ) -> LoomResult<Option<ResolveResult>> {
        lock(&self.inner.resolve_calls).push((param.source.clone(), caller.map(str::to_string)));
        Ok(lock(&self.inner.resolutions).get(&param.source).cloned())
    }

    async fn add_watch_file(&self, current: &str, target: &str) -> LoomResult<()> {
        lock(&self.inner.watch_files).push((current.to_string(), target.to_string()));
        Ok(())
    }

    async fn emit_file(&self, params: EmitFileParams) -> LoomResult<()> {
        lock(&self.inner.emitted).push(params);
        Ok(())
    }

    async fn modules_by_file(&self, file: &str) -> LoomResult<Vec<ModuleInfo>> {
        Ok(lock(&self.inner.modules)
            .iter()
            .filter(|info| info.file == file)
            .cloned()
            .collect())
    }
}

impl DevServer for MockCompiler {
    fn root(&self) -> &Path {
        &self.inner.root
    }

    fn port(&self) -> u16 {
        self.inner.port
    }

    fn compiler_context(&self) -> Arc<dyn CompilerContext> {
        self.context()
    }
}

/// Copies each input verbatim to its output file name.
#[async_trait]
impl ModuleCompiler for MockCompiler {
    async fn compile(&self, config: &ResolvedConfig) -> LoomResult<Vec<PathBuf>> {
        lock(&self.inner.compiled).push(config.clone());
        if let Some(message) = lock(&self.inner.compile_error).clone() {
            return Err(LoomError::compiler(message));
        }

        let output = &config.compilation.output;
        tokio::fs::create_dir_all(&output.path).await?;

        let mut written = Vec::new();
        for (name, input) in &config.compilation.input {
            let content = tokio::fs::read_to_string(input).await?;
            let target = output
                .path
                .join(output.entry_filename.replace("[entryName]", name));
            tokio::fs::write(&target, content).await?;
            written.push(target);
        }
        Ok(written)
    }
}
