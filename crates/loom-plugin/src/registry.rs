//! Plugin registry: builds the sorted execution order once per config.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use loom_core::config::UserConfig;
use loom_core::types::ConfigEnv;
use loom_core::{LoomError, LoomResult};

use crate::ecosystem::EcosystemAdapter;
use crate::external::ExternalModulePlugin;
use crate::hooks::filter::HookFilters;
use crate::plugin::{Plugin, PluginEntry};

/// One registered plugin and its snapshot of ordering data.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    /// Unique plugin name.
    pub name: String,
    /// Priority (higher runs first).
    pub priority: i32,
    /// Position in the user's plugin list.
    pub index: usize,
    /// Filters taken when the plugin was registered.
    pub filters: HookFilters,
    /// The plugin (native, or an adapted ecosystem plugin).
    pub plugin: Arc<dyn Plugin>,
}

impl PluginDescriptor {
    fn new(plugin: Arc<dyn Plugin>, index: usize) -> Self {
        Self {
            name: plugin.name().to_string(),
            priority: plugin.priority(),
            index,
            filters: plugin.filters(),
            plugin,
        }
    }
}

/// Sorted, immutable list of plugins.
///
/// The same order is used for every hook; filtering happens at dispatch
/// time. The implicit external-module plugin always comes last.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
}

impl PluginRegistry {
    /// Builds the registry from the user's plugin list.
    ///
    /// Ecosystem entries are wrapped in one adapter each, bound to `config`
    /// and `env`. Fails on duplicate names.
    pub fn build(
        entries: Vec<PluginEntry>,
        config: &UserConfig,
        env: ConfigEnv,
    ) -> LoomResult<Self> {
        let mut seen = HashSet::new();
        seen.insert(ExternalModulePlugin::NAME.to_string());

        let mut plugins = Vec::with_capacity(entries.len() + 1);
        for (index, entry) in entries.into_iter().enumerate() {
            if !seen.insert(entry.name().to_string()) {
                return Err(LoomError::duplicate_plugin(entry.name()));
            }

            let plugin: Arc<dyn Plugin> = match entry {
                PluginEntry::Native(plugin) => plugin,
                PluginEntry::Ecosystem(plugin) => {
                    Arc::new(EcosystemAdapter::new(plugin, config, env)?)
                }
            };
            plugins.push(PluginDescriptor::new(plugin, index));
        }

        // Stable: equal priorities keep declaration order.
        plugins.sort_by_key(|descriptor| std::cmp::Reverse(descriptor.priority));

        let external: Arc<dyn Plugin> = Arc::new(ExternalModulePlugin::new(config)?);
        let index = plugins.len();
        plugins.push(PluginDescriptor::new(external, index));

        for descriptor in &plugins {
            debug!(
                plugin = %descriptor.name,
                priority = descriptor.priority,
                "Plugin registered"
            );
        }
        info!(count = plugins.len(), "Plugin registry built");

        Ok(Self { plugins })
    }

    /// Returns the plugins in execution order.
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    /// Returns the plugin names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|d| d.name.as_str()).collect()
    }

    /// Gets a plugin by name.
    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|d| d.name == name)
    }

    /// Returns plugin count, the external-module plugin included.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
