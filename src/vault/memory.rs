//! In-process secret store

use crate::error::{PassEnvError, PassEnvResult};
use crate::vault::{RemoveOutcome, SecretStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Secret store backed by a map, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `(key, content)` pairs
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Whether `key` is currently stored
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A poisoned map is still structurally valid
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn show(&self, key: &str) -> PassEnvResult<Vec<u8>> {
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| PassEnvError::StoreEntryNotFound(key.to_string()))
    }

    async fn insert(&self, key: &str, content: &[u8]) -> PassEnvResult<()> {
        self.lock().insert(key.to_string(), content.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PassEnvResult<RemoveOutcome> {
        Ok(match self.lock().remove(key) {
            Some(_) => RemoveOutcome::Removed,
            None => RemoveOutcome::NotPresent,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
