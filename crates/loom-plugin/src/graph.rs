//! Read-only, file-keyed projection of the native module graph.
//!
//! Built on demand from [`CompilerContext::modules_by_file`] for the files
//! of one hot update, and thrown away afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use loom_core::LoomResult;
use loom_core::traits::CompilerContext;
use loom_core::types::{ModuleInfo, ModuleType};

/// One module as seen by hot-update hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowModuleNode {
    /// Module id.
    pub id: String,
    /// File the module was loaded from.
    pub file: String,
    /// Public URL of the module.
    pub url: String,
    /// Module type.
    pub module_type: ModuleType,
    /// Ids of importing modules.
    pub importers: Vec<String>,
    /// Ids of imported modules.
    pub imported: Vec<String>,
}

impl From<ModuleInfo> for ShadowModuleNode {
    fn from(info: ModuleInfo) -> Self {
        let url = if info.id.starts_with('/') {
            info.id.clone()
        } else {
            format!("/{}", info.id)
        };
        Self {
            id: info.id,
            file: info.file,
            url,
            module_type: info.module_type,
            importers: info.importers,
            imported: info.imported,
        }
    }
}

/// File-keyed view over a set of modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraphShadow {
    by_file: BTreeMap<String, Vec<ShadowModuleNode>>,
    by_id: HashMap<String, (String, usize)>,
}

impl ModuleGraphShadow {
    /// Queries the compiler for every module of every listed file.
    ///
    /// A file with no modules is kept with an empty list.
    pub async fn build<I, S>(ctx: &dyn CompilerContext, files: I) -> LoomResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut shadow = Self::default();
        for file in files {
            let file = file.as_ref();
            if shadow.by_file.contains_key(file) {
                continue;
            }
            let modules = ctx.modules_by_file(file).await?;
            shadow.insert_file(file, modules);
        }
        Ok(shadow)
    }

    /// Builds a shadow from already-fetched module records.
    pub fn from_modules(modules: impl IntoIterator<Item = ModuleInfo>) -> Self {
        let mut grouped: BTreeMap<String, Vec<ModuleInfo>> = BTreeMap::new();
        for info in modules {
            grouped.entry(info.file.clone()).or_default().push(info);
        }

        let mut shadow = Self::default();
        for (file, modules) in grouped {
            shadow.insert_file(&file, modules);
        }
        shadow
    }

    fn insert_file(&mut self, file: &str, modules: Vec<ModuleInfo>) {
        let nodes: Vec<ShadowModuleNode> = modules.into_iter().map(Into::into).collect();
        for (position, node) in nodes.iter().enumerate() {
            self.by_id
                .insert(node.id.clone(), (file.to_string(), position));
        }
        self.by_file.insert(file.to_string(), nodes);
    }

    /// Returns the modules loaded from `file`.
    pub fn modules_by_file(&self, file: &str) -> &[ShadowModuleNode] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the module with the given id.
    pub fn module_by_id(&self, id: &str) -> Option<&ShadowModuleNode> {
        let (file, position) = self.by_id.get(id)?;
        self.by_file.get(file)?.get(*position)
    }

    /// Returns the files in the shadow.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.by_file.keys().map(String::as_str)
    }

    /// Returns the number of modules in the shadow.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns whether the shadow holds no modules.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCompiler, module_info};

    #[tokio::test]
    async fn test_build_groups_by_file() {
        let compiler = MockCompiler::new("/app");
        compiler.add_module(module_info("src/App.vue", "/app/src/App.vue"));
        compiler.add_module(module_info(
            "src/App.vue?vue&type=style&lang.css",
            "/app/src/App.vue",
        ));
        compiler.add_module(module_info("src/main.ts", "/app/src/main.ts"));

        let shadow = ModuleGraphShadow::build(
            &compiler,
            ["/app/src/App.vue", "/app/src/missing.ts", "/app/src/App.vue"],
        )
        .await
        .expect("shadow");

        assert_eq!(shadow.len(), 2);
        assert_eq!(shadow.modules_by_file("/app/src/App.vue").len(), 2);
        assert!(shadow.modules_by_file("/app/src/missing.ts").is_empty());
        assert!(shadow.module_by_id("src/main.ts").is_none());
        assert_eq!(
            shadow.files().collect::<Vec<_>>(),
            vec!["/app/src/App.vue", "/app/src/missing.ts"]
        );
    }

    #[test]
    fn test_node_url_and_lookup_by_id() {
        let shadow =
            ModuleGraphShadow::from_modules([module_info("src/a.ts", "/app/src/a.ts")]);
        let node = shadow.module_by_id("src/a.ts").expect("node");
        assert_eq!(node.url, "/src/a.ts");
        assert_eq!(node.module_type, ModuleType::Ts);
    }
}
