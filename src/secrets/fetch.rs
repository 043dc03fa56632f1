//! Concurrent secret resolution against the primary store
//!
//! One task per pair, all awaited before deciding. If any lookup
//! failed the whole fetch fails with the first failure in name order;
//! values that did resolve are dropped with it.

use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::{EnvSpec, SecretValues};
use crate::vault::SecretStore;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::debug;

/// Resolves environment specifications against a secret store
#[derive(Clone)]
pub struct SecretFetcher {
    store: Arc<dyn SecretStore>,
}

impl SecretFetcher {
    /// Create a fetcher reading from `store`
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Resolve every pair of `spec` or fail as a whole
    pub async fn fetch(&self, spec: &EnvSpec) -> PassEnvResult<SecretValues> {
        debug!(
            "Fetching {} secret(s) from {} store",
            spec.len(),
            self.store.backend_name()
        );

        let handles: Vec<_> = spec
            .iter()
            .map(|(name, path)| {
                let store = Arc::clone(&self.store);
                let name = name.to_string();
                let path = path.to_string();
                tokio::spawn(async move {
                    let result = store.show(&path).await;
                    (name, path, result)
                })
            })
            .collect();

        let mut values = SecretValues::new();
        let mut first_error = None;

        for joined in join_all(handles).await {
            let (name, path, result) = joined
                .map_err(|e| PassEnvError::Internal(format!("secret lookup task failed: {}", e)))?;

            let failure = match result.map(|content| first_line(&content)) {
                Ok(Some(value)) => {
                    values.insert(name, value);
                    continue;
                }
                Ok(None) => PassEnvError::SecretNotUtf8(path),
                Err(e) => {
                    debug!("Lookup of {} for {} failed: {}", path, name, e);
                    PassEnvError::secret_not_found(path, e)
                }
            };
            if first_error.is_none() {
                first_error = Some(failure);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(values),
        }
    }
}

/// First line of a decrypted secret, trimmed; `None` unless valid UTF-8
fn first_line(content: &[u8]) -> Option<String> {
    let line = content.split(|b| *b == b'\n').next().unwrap_or_default();
    std::str::from_utf8(line).ok().map(|text| text.trim().to_string())
}
