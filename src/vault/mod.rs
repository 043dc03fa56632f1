//! Vault backend abstraction
//!
//! Both the primary password store and the cache store speak the same
//! command-line contract (`show`, `insert`, `rm`). The trait lets the
//! cache and fetch layers run against `pass` in production and an
//! in-memory map in tests.

mod memory;
mod pass;

pub use memory::MemoryStore;
pub use pass::PassStore;

use crate::error::PassEnvResult;
use async_trait::async_trait;

/// Result of removing a key from a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The key existed and was deleted
    Removed,
    /// The key was not in the store
    NotPresent,
}

/// Abstract secret store interface
///
/// `show` reports a missing key as `PassEnvError::StoreEntryNotFound`
/// so callers can tell absence apart from backend failures without
/// inspecting message text.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Return the decrypted content stored under `key`
    async fn show(&self, key: &str) -> PassEnvResult<Vec<u8>>;

    /// Store `content` under `key`, overwriting any existing entry
    async fn insert(&self, key: &str, content: &[u8]) -> PassEnvResult<()>;

    /// Delete `key`
    async fn remove(&self, key: &str) -> PassEnvResult<RemoveOutcome>;

    /// Human-readable backend name for logs
    fn backend_name(&self) -> &'static str;
}
