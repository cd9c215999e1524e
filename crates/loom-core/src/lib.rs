//! # loom-core
//!
//! Core crate for loom. Contains configuration schemas (user-facing and
//! resolved), hook parameter/result types, module and query helpers, the
//! traits through which the native compiler and dev server are consumed,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other loom crates.

pub mod config;
pub mod error;
pub mod merge;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, LoomError};
pub use result::LoomResult;
