//! Collaborators used by the stage-0 config-file compilation.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::config::ResolvedConfig;
use crate::result::LoomResult;
use crate::types::ConfigEnv;

/// Compiles a module graph with a given configuration.
#[async_trait]
pub trait ModuleCompiler: Send + Sync {
    /// Compiles and writes the output, returning the written files.
    async fn compile(&self, config: &ResolvedConfig) -> LoomResult<Vec<PathBuf>>;
}

/// A config function: `export default (env) => ({ ... })`.
pub type ConfigFactory = Arc<dyn Fn(ConfigEnv) -> BoxFuture<'static, LoomResult<Value>> + Send + Sync>;

/// The default export of a compiled config module.
#[derive(Clone)]
pub enum ConfigExport {
    /// A plain object export.
    Object(Value),
    /// A function of the config environment.
    Factory(ConfigFactory),
}

impl std::fmt::Debug for ConfigExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object(value) => f.debug_tuple("Object").field(value).finish(),
            Self::Factory(_) => f.debug_tuple("Factory").field(&"<function>").finish(),
        }
    }
}

impl ConfigExport {
    /// Produces the config object, calling the factory if needed.
    pub async fn into_value(self, env: ConfigEnv) -> LoomResult<Value> {
        match self {
            Self::Object(value) => Ok(value),
            Self::Factory(factory) => factory(env).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Command, Mode};

    #[tokio::test]
    async fn test_factory_export_receives_env() {
        let factory: ConfigFactory = Arc::new(|env: ConfigEnv| {
            Box::pin(async move { Ok(serde_json::json!({ "mode": env.mode.as_str() })) })
                as BoxFuture<'static, LoomResult<Value>>
        });
        let env = ConfigEnv {
            mode: Mode::Production,
            command: Command::Build,
        };
        let value = ConfigExport::Factory(factory)
            .into_value(env)
            .await
            .expect("factory");
        assert_eq!(value["mode"], "production");
    }

    #[tokio::test]
    async fn test_object_export_passthrough() {
        let env = ConfigEnv {
            mode: Mode::Development,
            command: Command::Serve,
        };
        let value = ConfigExport::Object(serde_json::json!({ "root": "/app" }))
            .into_value(env)
            .await
            .expect("object");
        assert_eq!(value["root"], "/app");
    }
}
