//! Workspace integration tests: config resolution driving plugin dispatch.

mod helpers;

mod config_test;
mod dispatch_test;
mod ecosystem_test;
