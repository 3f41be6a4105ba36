//! Registry of statically linked processor factories.
//!
//! This is the explicit plugin boundary of the runner: processor
//! implementations are compiled in and registered at startup under a
//! module/class identifier pair. Loading never consults implicit search
//! paths; an identifier pair either resolves here or fails.

use indexmap::IndexMap;

use crate::error::LoadError;
use crate::processor::Factory;

/// Registry mapping module/class identifier pairs to factories
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: IndexMap<(String, String), Factory>,
}

impl ProcessorRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Register a factory under a module/class identifier pair.
    ///
    /// Registering the same pair twice replaces the earlier factory.
    pub fn register(
        &mut self,
        module: impl Into<String>,
        class: impl Into<String>,
        factory: Factory,
    ) {
        self.factories.insert((module.into(), class.into()), factory);
    }

    /// Builder-style registration
    #[must_use]
    pub fn with(
        mut self,
        module: impl Into<String>,
        class: impl Into<String>,
        factory: Factory,
    ) -> Self {
        self.register(module, class, factory);
        self
    }

    /// Resolve a factory by module and class identifier
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Resolution` if no factory is registered for the pair
    pub fn resolve(&self, module: &str, class: &str) -> Result<Factory, LoadError> {
        self.factories
            .get(&(module.to_string(), class.to_string()))
            .cloned()
            .ok_or_else(|| LoadError::Resolution {
                module: module.to_string(),
                class: class.to_string(),
            })
    }

    /// Whether a factory is registered for the pair
    #[must_use]
    pub fn contains(&self, module: &str, class: &str) -> bool {
        self.factories
            .contains_key(&(module.to_string(), class.to_string()))
    }

    /// Number of registered factories
    #[must_use]
    pub fn count(&self) -> usize {
        self.factories.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
