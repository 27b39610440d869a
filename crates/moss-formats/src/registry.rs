//! Registry mapping CLI prefixes to format plugins.

use crate::plugin::{Creator, Detector};

/// One registered format: a prefix plus factories for fresh detector and
/// creator instances.
pub struct FormatPlugin {
    /// Lowercase CLI prefix, e.g. `korgmultisample`.
    pub prefix: &'static str,
    /// Display name of the format.
    pub name: &'static str,
    make_detector: fn() -> Box<dyn Detector>,
    make_creator: fn() -> Box<dyn Creator>,
}

impl FormatPlugin {
    /// Defines a plugin from its factories.
    pub fn new(
        prefix: &'static str,
        name: &'static str,
        make_detector: fn() -> Box<dyn Detector>,
        make_creator: fn() -> Box<dyn Creator>,
    ) -> Self {
        Self {
            prefix,
            name,
            make_detector,
            make_creator,
        }
    }
}

/// Errors that can occur while building a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A plugin with this prefix is already registered.
    PrefixConflict(&'static str),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrefixConflict(prefix) => {
                write!(f, "format prefix already registered: {prefix}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// The plugin table; immutable after construction.
pub struct FormatRegistry {
    plugins: Vec<FormatPlugin>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// The registry with all built-in formats.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for plugin in [
            crate::korg::plugin(),
            crate::sfz::plugin(),
            crate::decentsampler::plugin(),
            crate::samplefile::plugin(),
        ] {
            registry
                .register(plugin)
                .expect("built-in prefixes are unique");
        }
        registry
    }

    /// Registers a plugin; fails on a duplicate prefix.
    pub fn register(&mut self, plugin: FormatPlugin) -> Result<(), RegistryError> {
        if self.plugins.iter().any(|p| p.prefix == plugin.prefix) {
            return Err(RegistryError::PrefixConflict(plugin.prefix));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Looks up a plugin by its prefix.
    pub fn get(&self, prefix: &str) -> Option<&FormatPlugin> {
        self.plugins.iter().find(|p| p.prefix == prefix)
    }

    /// Creates a fresh detector for the prefix.
    pub fn create_detector(&self, prefix: &str) -> Option<Box<dyn Detector>> {
        self.get(prefix).map(|p| (p.make_detector)())
    }

    /// Creates a fresh creator for the prefix.
    pub fn create_creator(&self, prefix: &str) -> Option<Box<dyn Creator>> {
        self.get(prefix).map(|p| (p.make_creator)())
    }

    /// All registered prefixes, in registration order.
    pub fn prefixes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|p| p.prefix)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
