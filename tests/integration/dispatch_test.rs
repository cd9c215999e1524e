//! Ordering and first-match dispatch through a resolved session.

use std::sync::Arc;

use loom_core::types::{Command, ResolveParam};
use loom_plugin::ExternalModulePlugin;
use loom_plugin::prelude::*;

use crate::helpers::{SuffixResolver, compiler, html_project, session};

fn special(enforce: Option<Enforce>) -> PluginEntry {
    PluginEntry::Native(Arc::new(SuffixResolver {
        name: "special",
        enforce,
        suffix: ".special",
        target: "/virtual/special",
    }))
}

fn never() -> PluginEntry {
    PluginEntry::Native(Arc::new(SuffixResolver {
        name: "never",
        enforce: None,
        suffix: ".never-matches",
        target: "/unused",
    }))
}

#[tokio::test]
async fn test_pre_plugin_resolves_special_sources() {
    let dir = html_project().await;
    let session = session(
        dir.path(),
        Command::Serve,
        vec![never(), special(Some(Enforce::Pre))],
    )
    .await;

    assert_eq!(
        session.dispatcher.registry().names(),
        vec!["special", "never", ExternalModulePlugin::NAME]
    );

    let (_mock, ctx) = compiler(dir.path());
    let resolved = session
        .dispatcher
        .resolve(&ResolveParam::new("a.special", Some("/app/x.ts")), &ctx)
        .await
        .expect("Dispatch failed")
        .expect("No plugin resolved the source");

    assert_eq!(resolved.resolved_path, "/virtual/special");
    assert!(!resolved.external);
    assert!(!resolved.side_effects);
}

#[tokio::test]
async fn test_unmatched_source_resolves_to_none() {
    let dir = html_project().await;
    let session = session(dir.path(), Command::Build, vec![special(None), never()]).await;
    let (_mock, ctx) = compiler(dir.path());

    let resolved = session
        .dispatcher
        .resolve(&ResolveParam::new("./plain.ts", Some("/app/x.ts")), &ctx)
        .await
        .expect("Dispatch failed");
    assert!(resolved.is_none());
}

#[tokio::test]
async fn test_duplicate_plugin_names_fail_resolution() {
    let dir = html_project().await;
    let err = loom_config::ConfigResolver::new(
        Command::Build,
        loom_core::config::env::EnvOverrides::default(),
    )
    .with_plugins(vec![special(None), special(Some(Enforce::Post))])
    .resolve(&crate::helpers::inline(dir.path()))
    .await
    .expect_err("Duplicate names must be rejected");

    assert!(err.is(loom_core::ErrorKind::DuplicatePlugin));
}
