//! Key-value persistence for customizations.

use dashmap::DashMap;

use crate::error::BackendError;

/// Backend trait for customization storage.
///
/// Implementations store raw strings by key. Whether a backend exists at all
/// depends on the environment; the customization store takes an
/// `Option<Arc<dyn PersistenceBackend>>` and treats `None` as "nothing is ever
/// stored".
pub trait PersistenceBackend: Send + Sync {
    /// Get the raw string for a key.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Set the raw string for a key.
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;
}

/// An in-memory backend backed by a concurrent hash map.
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: DashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, as if written by an earlier session.
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.store.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl PersistenceBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.store.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.store.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
