//! Per-hook request filters.
//!
//! A filter is a conjunction of pattern sets. Patterns are regexes; glob
//! patterns are translated to anchored regexes by [`PatternSet::from_globs`].
//! An empty set matches everything, so an empty filter matches every request.

use regex::Regex;

use loom_core::LoomResult;
use loom_core::types::{LoadParam, ResolveParam, TransformParam};

/// A set of compiled patterns; matches when any pattern matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles a list of regex sources.
    pub fn new<I, S>(sources: I) -> LoomResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = sources
            .into_iter()
            .map(|source| Regex::new(source.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Compiles a list of glob patterns.
    ///
    /// `**` matches across `/`, `*` and `?` stay within one path segment,
    /// and `{a,b}` matches either alternative.
    pub fn from_globs<I, S>(globs: I) -> LoomResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(globs.into_iter().map(|glob| glob_to_regex(glob.as_ref())))
    }

    /// Returns whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns whether `value` matches (always true for an empty set).
    pub fn matches(&self, value: &str) -> bool {
        self.is_empty() || self.matches_any(value)
    }

    /// Returns whether any pattern matches (false for an empty set).
    pub fn matches_any(&self, value: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(value))
    }

    /// Returns the pattern sources.
    pub fn sources(&self) -> Vec<&str> {
        self.patterns.iter().map(Regex::as_str).collect()
    }
}

/// Translates a glob into an anchored regex source.
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::from("^");
    let mut chars = glob.chars().peekable();
    let mut in_group = false;

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '{' if !in_group => {
                in_group = true;
                out.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// Conjunction of pattern sets over the fields of a module request.
#[derive(Debug, Clone, Default)]
pub struct HookFilter {
    /// Patterns over the resolve specifier.
    pub sources: PatternSet,
    /// Patterns over the importer's module id.
    pub importers: PatternSet,
    /// Patterns over the resolved path.
    pub resolved_paths: PatternSet,
    /// Patterns over the module type name.
    pub module_types: PatternSet,
}

impl HookFilter {
    /// A filter matching every request.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the resolve specifier.
    pub fn with_sources<S: AsRef<str>>(mut self, sources: &[S]) -> LoomResult<Self> {
        self.sources = PatternSet::new(sources)?;
        Ok(self)
    }

    /// Restricts the importer.
    pub fn with_importers<S: AsRef<str>>(mut self, importers: &[S]) -> LoomResult<Self> {
        self.importers = PatternSet::new(importers)?;
        Ok(self)
    }

    /// Restricts the resolved path.
    pub fn with_resolved_paths<S: AsRef<str>>(mut self, paths: &[S]) -> LoomResult<Self> {
        self.resolved_paths = PatternSet::new(paths)?;
        Ok(self)
    }

    /// Restricts the module type.
    pub fn with_module_types<S: AsRef<str>>(mut self, module_types: &[S]) -> LoomResult<Self> {
        self.module_types = PatternSet::new(module_types)?;
        Ok(self)
    }

    /// Matches a resolve request.
    ///
    /// A request without an importer passes only when no importer patterns
    /// are configured.
    pub fn matches_resolve(&self, param: &ResolveParam) -> bool {
        let importer_ok = match &param.importer {
            Some(importer) => self.importers.matches(importer),
            None => self.importers.is_empty(),
        };
        importer_ok && self.sources.matches(&param.source)
    }

    /// Matches a load request.
    pub fn matches_load(&self, param: &LoadParam) -> bool {
        self.resolved_paths.matches(&param.resolved_path)
    }

    /// Matches a transform request.
    pub fn matches_transform(&self, param: &TransformParam) -> bool {
        self.resolved_paths.matches(&param.resolved_path)
            && self.module_types.matches(param.module_type.as_str())
    }
}

/// The filters of one plugin, one per filterable hook.
#[derive(Debug, Clone, Default)]
pub struct HookFilters {
    /// Filter applied before `resolve`.
    pub resolve: HookFilter,
    /// Filter applied before `load`.
    pub load: HookFilter,
    /// Filter applied before `transform`.
    pub transform: HookFilter,
}
