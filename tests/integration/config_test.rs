//! End-to-end config resolution from files on disk.

use loom_config::inline::InlineServerOptions;
use loom_config::normalize::runtime::HMR_PLUGIN;
use loom_config::ConfigResolver;
use loom_core::ErrorKind;
use loom_core::config::env::EnvOverrides;
use loom_core::types::{Command, Mode};
use serde_json::json;

use crate::helpers::{html_project, inline, project, session};

#[tokio::test]
async fn test_toml_config_below_cli_options() {
    let dir = project(&[
        ("index.html", "<html></html>"),
        (
            "loom.config.toml",
            r#"
[server]
port = 3000
host = "0.0.0.0"

[compilation.output]
path = "build"
"#,
        ),
    ])
    .await;

    let mut options = inline(dir.path());
    options.server = Some(InlineServerOptions {
        port: Some(4100),
        ..Default::default()
    });

    let session = ConfigResolver::new(Command::Build, EnvOverrides::default())
        .resolve(&options)
        .await
        .expect("Failed to resolve config");
    let config = &session.config;

    assert_eq!(config.mode, Mode::Production);
    assert_eq!(config.server.port, 4100);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.compilation.output.path, dir.path().join("build"));
    assert_eq!(
        config.config_file_path,
        Some(dir.path().join("loom.config.toml"))
    );
}

#[tokio::test]
async fn test_production_build_output() {
    let dir = html_project().await;
    let session = session(dir.path(), Command::Build, Vec::new()).await;
    let config = &session.config;

    assert_eq!(config.compilation.input["index"], "./index.html");
    assert!(config.compilation.output.filename.contains("[contentHash]"));
    assert!(config.compilation.minify);
    assert!(!config.compilation.lazy_compilation);
    assert!(config.server.hmr.is_none());
    assert_eq!(
        config.compilation.define["process.env.NODE_ENV"],
        json!("production")
    );
}

#[tokio::test]
async fn test_dev_session_injects_hmr_client() {
    let dir = html_project().await;
    let session = session(dir.path(), Command::Serve, Vec::new()).await;
    let config = &session.config;

    let hmr = config.server.hmr.as_ref().expect("HMR should be enabled");
    assert_eq!(hmr.protocol, "ws");
    assert_eq!(config.compilation.define["LOOM_HMR_PORT"], json!(hmr.port));
    assert!(
        config
            .compilation
            .runtime
            .plugins
            .iter()
            .any(|plugin| plugin.ends_with(HMR_PLUGIN))
    );
    assert!(!config.compilation.output.filename.contains("[contentHash]"));
}

#[tokio::test]
async fn test_node_project_without_html_skips_hmr_client() {
    let dir = project(&[
        ("index.ts", "export {}"),
        (
            "loom.config.json",
            r#"{ "compilation": { "output": { "targetEnv": "node" } } }"#,
        ),
    ])
    .await;
    let session = session(dir.path(), Command::Serve, Vec::new()).await;
    let config = &session.config;

    assert_eq!(config.compilation.input["index"], "./index.ts");
    assert!(config.server.hmr.is_some());
    assert!(!config.compilation.define.contains_key("LOOM_HMR_PORT"));
}

#[tokio::test]
async fn test_missing_explicit_config_file() {
    let dir = html_project().await;
    let mut options = inline(dir.path());
    options.config_path = Some("missing.config.json".into());

    let err = ConfigResolver::new(Command::Serve, EnvOverrides::default())
        .resolve(&options)
        .await
        .expect_err("A missing explicit config must fail");
    assert!(err.is(ErrorKind::ConfigLoad));
}
