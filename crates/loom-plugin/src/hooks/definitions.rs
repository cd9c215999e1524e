//! Hook definitions: which hooks exist and how their results combine.

use serde::{Deserialize, Serialize};

/// Enumeration of every native hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookKind {
    // ── Config lifecycle ──
    /// Contributes a partial config, merged before the next plugin runs.
    Config,
    /// Observes the final resolved config.
    ConfigResolved,
    /// Receives the running dev server.
    ConfigureDevServer,

    // ── Build ──
    /// Fired once before a compilation pass.
    BuildStart,
    /// Resolves a specifier to a module.
    Resolve,
    /// Loads a resolved module's content.
    Load,
    /// Transforms a loaded module's content.
    Transform,
    /// Fired once after all modules are built.
    BuildEnd,
    /// Fired once after resources are written.
    Finish,

    // ── HMR ──
    /// Computes the modules affected by changed files.
    UpdateModules,
}

/// How a hook's per-plugin results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCombination {
    /// Stop at the first plugin returning a value.
    FirstMatch,
    /// Run every plugin in order; the first error aborts the rest.
    FailFast,
    /// Run every plugin and union the returned lists.
    Union,
    /// Run every plugin in order, merging each contribution before the next.
    SequentialMerge,
}

impl HookKind {
    /// Every hook, in lifecycle order.
    pub const ALL: [HookKind; 10] = [
        Self::Config,
        Self::ConfigResolved,
        Self::ConfigureDevServer,
        Self::BuildStart,
        Self::Resolve,
        Self::Load,
        Self::Transform,
        Self::BuildEnd,
        Self::Finish,
        Self::UpdateModules,
    ];

    /// Returns the native name of this hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::ConfigResolved => "configResolved",
            Self::ConfigureDevServer => "configureDevServer",
            Self::BuildStart => "buildStart",
            Self::Resolve => "resolve",
            Self::Load => "load",
            Self::Transform => "transform",
            Self::BuildEnd => "buildEnd",
            Self::Finish => "finish",
            Self::UpdateModules => "updateModules",
        }
    }

    /// Returns the ecosystem hook feeding this native hook.
    pub fn foreign_name(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::ConfigResolved => "configResolved",
            Self::ConfigureDevServer => "configureServer",
            Self::BuildStart => "buildStart",
            Self::Resolve => "resolveId",
            Self::Load => "load",
            Self::Transform => "transform",
            Self::BuildEnd => "buildEnd",
            Self::Finish => "closeBundle",
            Self::UpdateModules => "handleHotUpdate",
        }
    }

    /// Returns the combination rule of this hook.
    pub fn combination(&self) -> HookCombination {
        match self {
            Self::Resolve | Self::Load | Self::Transform => HookCombination::FirstMatch,
            Self::Config => HookCombination::SequentialMerge,
            Self::UpdateModules => HookCombination::Union,
            Self::ConfigResolved
            | Self::ConfigureDevServer
            | Self::BuildStart
            | Self::BuildEnd
            | Self::Finish => HookCombination::FailFast,
        }
    }

    /// Returns whether this hook accepts a per-plugin filter.
    pub fn is_filterable(&self) -> bool {
        matches!(self, Self::Resolve | Self::Load | Self::Transform)
    }
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_rules() {
        assert_eq!(HookKind::Resolve.combination(), HookCombination::FirstMatch);
        assert_eq!(HookKind::Transform.combination(), HookCombination::FirstMatch);
        assert_eq!(HookKind::BuildStart.combination(), HookCombination::FailFast);
        assert_eq!(HookKind::Finish.combination(), HookCombination::FailFast);
        assert_eq!(HookKind::UpdateModules.combination(), HookCombination::Union);
        assert_eq!(HookKind::Config.combination(), HookCombination::SequentialMerge);
    }

    #[test]
    fn test_foreign_names() {
        assert_eq!(HookKind::Resolve.foreign_name(), "resolveId");
        assert_eq!(HookKind::Finish.foreign_name(), "closeBundle");
        assert_eq!(HookKind::UpdateModules.foreign_name(), "handleHotUpdate");
        assert_eq!(HookKind::ConfigureDevServer.foreign_name(), "configureServer");
    }

    #[test]
    fn test_only_module_hooks_are_filterable() {
        let filterable: Vec<_> = HookKind::ALL
            .iter()
            .filter(|hook| hook.is_filterable())
            .collect();
        assert_eq!(
            filterable,
            vec![&HookKind::Resolve, &HookKind::Load, &HookKind::Transform]
        );
    }
}
