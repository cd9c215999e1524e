//! Hook system: hook definitions, per-plugin filters, and the dispatcher.

pub mod definitions;
pub mod dispatcher;
pub mod filter;
