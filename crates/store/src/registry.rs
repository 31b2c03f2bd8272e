//! Process-wide name → namespace registry.
//!
//! The registry mutex guards only the map itself. Lookups clone the `Arc`
//! and release the lock before any namespace lock is taken; namespaces are
//! never removed once published.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::namespace::Namespace;

#[derive(Default)]
pub struct Registry {
    spaces: Mutex<HashMap<String, Arc<Namespace>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Look up a namespace by name.
    pub fn get(&self, name: &str) -> Option<Arc<Namespace>> {
        self.spaces.lock().get(name).cloned()
    }

    /// Publish a fully constructed namespace under `name`.
    ///
    /// If another thread published the same name first, that namespace wins
    /// and `ns` is discarded; the caller always receives the registered one.
    pub fn publish(&self, name: &str, ns: Arc<Namespace>) -> Arc<Namespace> {
        let mut spaces = self.spaces.lock();
        spaces.entry(name.to_string()).or_insert(ns).clone()
    }

    /// A point-in-time list of every registered namespace. Used by the
    /// snapshot walk so namespace locks are taken after the registry lock
    /// is already released.
    pub fn all(&self) -> Vec<Arc<Namespace>> {
        self.spaces.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.spaces.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_before_publish_is_none() {
        let registry = Registry::new();
        assert!(registry.get("movies").is_none());
    }

    #[test]
    fn publish_keeps_first_winner() {
        let registry = Registry::new();
        let a = registry.publish("movies", Arc::new(Namespace::new("movies")));
        let b = registry.publish("movies", Arc::new(Namespace::new("movies")));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn all_returns_every_namespace() {
        let registry = Registry::new();
        registry.publish("a", Arc::new(Namespace::new("a")));
        registry.publish("b", Arc::new(Namespace::new("b")));
        assert_eq!(registry.all().len(), 2);
    }
}
