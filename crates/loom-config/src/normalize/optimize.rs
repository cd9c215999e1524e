//! Mode-dependent switches: lazy compilation, tree shaking, minify,
//! preset-env.

use tracing::error;

use loom_core::config::{ResolvedConfig, UserConfig};

/// Lazy compilation is off in production and on by default otherwise.
pub fn decide_lazy_compilation(config: &mut ResolvedConfig, user: &UserConfig) {
    config.compilation.lazy_compilation = if config.mode.is_production() {
        false
    } else {
        user.compilation()
            .and_then(|c| c.lazy_compilation)
            .unwrap_or(true)
    };
}

/// Tree shaking, minify, and preset-env default to on in production only.
pub fn decide_optimizations(config: &mut ResolvedConfig, user: &UserConfig) {
    let production = config.mode.is_production();
    let compilation = user.compilation();
    let pick = |value: Option<bool>| value.unwrap_or(production);

    config.compilation.tree_shaking = pick(compilation.and_then(|c| c.tree_shaking));
    config.compilation.minify = pick(compilation.and_then(|c| c.minify));
    config.compilation.preset_env = pick(compilation.and_then(|c| c.preset_env));
}

/// Tree shaking and lazy compilation cannot both be on; lazy compilation
/// is turned off and the correction logged.
pub fn enforce_mutual_exclusion(config: &mut ResolvedConfig) {
    if config.compilation.tree_shaking && config.compilation.lazy_compilation {
        error!(
            "treeShaking and lazyCompilation cannot both be enabled; lazyCompilation has been disabled"
        );
        config.compilation.lazy_compilation = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use loom_core::config::compilation::UserCompilationConfig;
    use loom_core::types::{Command, Mode};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Counts `ERROR` events.
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn user(compilation: UserCompilationConfig) -> UserConfig {
        UserConfig {
            compilation: Some(compilation),
            ..Default::default()
        }
    }

    #[test]
    fn test_lazy_compilation_defaults() {
        let mut dev = ResolvedConfig::new("/app", Mode::Development, Command::Serve);
        decide_lazy_compilation(&mut dev, &UserConfig::default());
        assert!(dev.compilation.lazy_compilation);

        let forced = user(UserCompilationConfig {
            lazy_compilation: Some(true),
            ..Default::default()
        });
        let mut prod = ResolvedConfig::new("/app", Mode::Production, Command::Build);
        decide_lazy_compilation(&mut prod, &forced);
        assert!(!prod.compilation.lazy_compilation);
    }

    #[test]
    fn test_optimizations_follow_mode_unless_set() {
        let explicit = user(UserCompilationConfig {
            minify: Some(false),
            ..Default::default()
        });
        let mut prod = ResolvedConfig::new("/app", Mode::Production, Command::Build);
        decide_optimizations(&mut prod, &explicit);
        assert!(prod.compilation.tree_shaking);
        assert!(!prod.compilation.minify);
        assert!(prod.compilation.preset_env);

        let mut dev = ResolvedConfig::new("/app", Mode::Development, Command::Serve);
        decide_optimizations(&mut dev, &UserConfig::default());
        assert!(!dev.compilation.tree_shaking);
        assert!(!dev.compilation.minify);
    }

    #[test]
    fn test_mutual_exclusion_logs_exactly_one_error() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(count.clone()));

        let tree_shaking = user(UserCompilationConfig {
            tree_shaking: Some(true),
            ..Default::default()
        });
        let mut config = ResolvedConfig::new("/app", Mode::Development, Command::Serve);

        tracing::subscriber::with_default(subscriber, || {
            decide_lazy_compilation(&mut config, &tree_shaking);
            decide_optimizations(&mut config, &tree_shaking);
            enforce_mutual_exclusion(&mut config);
        });

        assert!(config.compilation.tree_shaking);
        assert!(!config.compilation.lazy_compilation);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_conflict_logs_nothing() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(count.clone()));
        let mut config = ResolvedConfig::new("/app", Mode::Production, Command::Build);

        tracing::subscriber::with_default(subscriber, || {
            decide_lazy_compilation(&mut config, &UserConfig::default());
            decide_optimizations(&mut config, &UserConfig::default());
            enforce_mutual_exclusion(&mut config);
        });

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
