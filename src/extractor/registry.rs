use std::sync::Arc;
use thiserror::Error;

use crate::extractor::{ExtractorFactory, ExtractorGroup, builtin};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no extractor registered under '{0}'")]
    UnknownExtractor(String),
}

/// Extractor factories by name, in registration order.
#[derive(Default, Clone)]
pub struct ExtractorRegistry {
    factories: Vec<Arc<dyn ExtractorFactory>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in extractors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for factory in builtin::factories() {
            registry.register_arc(factory);
        }
        registry
    }

    /// Registers a factory, replacing any earlier one with the same name in place.
    pub fn register<F: ExtractorFactory + 'static>(&mut self, factory: F) {
        self.register_arc(Arc::new(factory));
    }

    pub fn register_arc(&mut self, factory: Arc<dyn ExtractorFactory>) {
        match self
            .factories
            .iter_mut()
            .find(|existing| existing.name() == factory.name())
        {
            Some(existing) => *existing = factory,
            None => self.factories.push(factory),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ExtractorFactory>> {
        self.factories.iter().find(|f| f.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    /// Every registered factory.
    pub fn group(&self) -> ExtractorGroup {
        ExtractorGroup::new(self.factories.clone())
    }

    /// The named factories, in the order given.
    pub fn group_for<'a, I>(&self, names: I) -> Result<ExtractorGroup, RegistryError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| RegistryError::UnknownExtractor(name.to_string()))
            })
            .collect()
    }
}
