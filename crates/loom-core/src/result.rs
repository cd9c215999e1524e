//! Convenience result type alias for loom.

use crate::error::LoomError;

/// A specialized `Result` type for loom operations.
pub type LoomResult<T> = Result<T, LoomError>;
