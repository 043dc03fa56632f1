//! Cache entries stored in pass-env's own password store
//!
//! Resolved values are serialized as JSON and inserted under the
//! fingerprint key. Reads fail open: anything that is not a clean
//! hit is reported as a miss.

use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::{Fingerprint, SecretValues};
use crate::vault::{RemoveOutcome, SecretStore};
use std::sync::Arc;
use tracing::debug;

/// Content-addressed cache on top of a secret store
#[derive(Clone)]
pub struct SecretCache {
    store: Arc<dyn SecretStore>,
}

impl SecretCache {
    /// Create a cache backed by `store`
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Look up the values cached under `fingerprint`
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<SecretValues> {
        let content = match self.store.show(fingerprint.as_str()).await {
            Ok(content) => content,
            Err(e) => {
                debug!("Cache miss for {}: {}", fingerprint, e);
                return None;
            }
        };

        match serde_json::from_slice::<SecretValues>(&content) {
            Ok(values) => {
                debug!("Cache hit for {}", fingerprint);
                Some(values)
            }
            Err(e) => {
                debug!("Cache entry {} is unreadable, treating as miss: {}", fingerprint, e);
                None
            }
        }
    }

    /// Store `values` under `fingerprint`, replacing any previous entry
    pub async fn set(&self, fingerprint: &Fingerprint, values: &SecretValues) -> PassEnvResult<()> {
        let content = serde_json::to_vec(values)?;

        self.store
            .insert(fingerprint.as_str(), &content)
            .await
            .map_err(|e| PassEnvError::CacheWrite {
                fingerprint: fingerprint.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Cached {} value(s) under {}", values.len(), fingerprint);
        Ok(())
    }

    /// Delete the entry for `fingerprint`
    pub async fn remove(&self, fingerprint: &Fingerprint) -> PassEnvResult<RemoveOutcome> {
        self.store.remove(fingerprint.as_str()).await
    }
}
