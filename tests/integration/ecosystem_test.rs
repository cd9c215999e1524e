//! Ecosystem plugins taking part in a full session.

use std::sync::Arc;

use serde_json::json;

use loom_core::types::{Command, UpdateModulesParam, UpdateType};
use loom_plugin::prelude::*;
use loom_plugin::testing::module_info;

use crate::helpers::{RecordingEcosystemPlugin, compiler, html_project, session};

#[tokio::test]
async fn test_ecosystem_config_contribution_reaches_resolved_config() {
    let dir = html_project().await;
    let plugin = Arc::new(RecordingEcosystemPlugin {
        name: "out-dir",
        contribution: Some(json!({ "build": { "outDir": "out" } })),
        ..Default::default()
    });

    let session = session(
        dir.path(),
        Command::Build,
        vec![PluginEntry::Ecosystem(plugin.clone())],
    )
    .await;

    assert_eq!(session.config.compilation.output.path, dir.path().join("out"));

    let views = plugin
        .resolved_views
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    assert_eq!(views.len(), 1);
    assert_eq!(
        views[0]["build"]["outDir"],
        json!(dir.path().join("out").to_string_lossy())
    );
}

#[tokio::test]
async fn test_foreign_value_forms_resolve_to_native_settings() {
    let dir = html_project().await;
    let plugin = Arc::new(RecordingEcosystemPlugin {
        name: "foreign-forms",
        contribution: Some(json!({
            "build": { "sourcemap": "hidden" },
            "server": { "host": true, "open": "/docs" },
            "envPrefix": "APP_"
        })),
        ..Default::default()
    });

    let session = session(
        dir.path(),
        Command::Serve,
        vec![PluginEntry::Ecosystem(plugin)],
    )
    .await;
    let config = &session.config;

    assert!(config.compilation.sourcemap);
    assert_eq!(config.server.host, "0.0.0.0");
    assert!(config.server.open);
    assert_eq!(config.env_prefix, vec!["APP_".to_string()]);
}

#[tokio::test]
async fn test_hot_update_falls_back_to_module_graph() {
    let dir = html_project().await;
    let plugin = Arc::new(RecordingEcosystemPlugin {
        name: "recorder",
        ..Default::default()
    });
    let session = session(
        dir.path(),
        Command::Serve,
        vec![PluginEntry::Ecosystem(plugin.clone())],
    )
    .await;

    let (mock, ctx) = compiler(dir.path());
    let changed = dir.path().join("src/app.ts").to_string_lossy().into_owned();
    mock.add_module(module_info("src/app.ts", &changed));
    mock.add_module(module_info("src/app.ts?raw", &changed));

    let param = UpdateModulesParam {
        paths: vec![(changed.clone(), UpdateType::Updated)],
    };
    let affected = session
        .dispatcher
        .update_modules(&param, &ctx)
        .await
        .expect("Failed to compute affected modules");

    assert_eq!(affected, vec!["src/app.ts", "src/app.ts?raw"]);
    let updates = plugin
        .hot_updates
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    assert_eq!(updates, vec![changed]);
}

#[tokio::test]
async fn test_apply_serve_plugin_is_inert_during_build() {
    #[derive(Debug)]
    struct ServeOnly;

    #[async_trait]
    impl EcosystemPlugin for ServeOnly {
        fn name(&self) -> &str {
            "serve-only"
        }

        fn apply(&self) -> Option<Apply> {
            Some(Apply::Command(Command::Serve))
        }

        async fn config(
            &self,
            _config: &serde_json::Value,
            _env: &loom_core::types::ConfigEnv,
        ) -> LoomResult<Option<serde_json::Value>> {
            Ok(Some(json!({ "build": { "outDir": "never" } })))
        }
    }

    let dir = html_project().await;
    let session = session(
        dir.path(),
        Command::Build,
        vec![PluginEntry::Ecosystem(Arc::new(ServeOnly))],
    )
    .await;

    assert_eq!(session.config.compilation.output.path, dir.path().join("dist"));
    assert!(session.dispatcher.registry().get("serve-only").is_some());
}
