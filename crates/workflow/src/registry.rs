//! Algorithm registry.
//!
//! Maps algorithm names to descriptors. Registration is an unconditional
//! upsert: registering a name twice keeps the second descriptor. There is no
//! removal. The registry is an ordinary value; callers construct it and pass
//! it to whoever needs it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thermocurve_core::{Error, Result};
use tracing::debug;

use crate::descriptor::{AlgoCategory, AlgorithmDescriptor};

/// Name → descriptor mapping.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    entries: HashMap<String, AlgorithmDescriptor>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the descriptor under its name.
    ///
    /// Returns the descriptor that was replaced, if any.
    pub fn register(&mut self, descriptor: AlgorithmDescriptor) -> Option<AlgorithmDescriptor> {
        let name = descriptor.name.clone();
        let previous = self.entries.insert(name.clone(), descriptor);
        if previous.is_some() {
            debug!(algorithm = %name, "descriptor replaced");
        }
        previous
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&AlgorithmDescriptor> {
        self.entries.get(name).ok_or_else(|| Error::NotFound {
            name: name.to_string(),
        })
    }

    /// All descriptors, in no particular order.
    pub fn all(&self) -> impl Iterator<Item = &AlgorithmDescriptor> {
        self.entries.values()
    }

    /// Descriptors of one category, sorted by name.
    pub fn by_category(&self, category: AlgoCategory) -> Vec<&AlgorithmDescriptor> {
        let mut found: Vec<_> = self.all().filter(|d| d.category == category).collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry behind a read-write lock, for registration racing with lookup.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<DescriptorRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: DescriptorRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn register(&self, descriptor: AlgorithmDescriptor) -> Result<Option<AlgorithmDescriptor>> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        Ok(guard.register(descriptor))
    }

    pub fn has(&self, name: &str) -> Result<bool> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.has(name))
    }

    /// Owned copy of the descriptor registered under `name`.
    pub fn get(&self, name: &str) -> Result<AlgorithmDescriptor> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        guard.get(name).cloned()
    }

    pub fn len(&self) -> Result<usize> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.len())
    }

    /// Point-in-time copy of the whole registry.
    pub fn snapshot(&self) -> Result<DescriptorRegistry> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }
}

impl From<DescriptorRegistry> for SharedRegistry {
    fn from(registry: DescriptorRegistry) -> Self {
        Self::new(registry)
    }
}

fn poisoned() -> Error {
    Error::Other("registry lock poisoned".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, display: &str, category: AlgoCategory) -> AlgorithmDescriptor {
        AlgorithmDescriptor::new(name, display, category)
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = DescriptorRegistry::new();
        assert!(registry.register(descriptor("dtg", "First", AlgoCategory::Derivative)).is_none());
        assert!(registry.has("dtg"));

        let replaced = registry.register(descriptor("dtg", "Second", AlgoCategory::Derivative));
        assert_eq!(replaced.map(|d| d.display_name), Some("First".to_string()));
        assert!(registry.has("dtg"));
        assert_eq!(registry.get("dtg").unwrap().display_name, "Second");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let registry = DescriptorRegistry::new();
        assert_eq!(
            registry.get("nope").unwrap_err(),
            Error::NotFound { name: "nope".into() }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_by_category_sorted() {
        let mut registry = DescriptorRegistry::new();
        registry.register(descriptor("zeta", "Z", AlgoCategory::Derivative));
        registry.register(descriptor("alpha", "A", AlgoCategory::Derivative));
        registry.register(descriptor("smooth", "S", AlgoCategory::Smoothing));

        let names: Vec<_> = registry
            .by_category(AlgoCategory::Derivative)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(registry.names(), vec!["alpha", "smooth", "zeta"]);
    }

    #[test]
    fn test_shared_registry_across_threads() {
        let shared = SharedRegistry::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .register(descriptor(&format!("algo{}", i), "X", AlgoCategory::Features))
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.len().unwrap(), 4);
        assert!(shared.has("algo2").unwrap());
        assert_eq!(shared.get("algo3").unwrap().name, "algo3");
        assert_eq!(shared.snapshot().unwrap().len(), 4);
    }
}
