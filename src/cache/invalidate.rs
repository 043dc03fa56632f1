//! Dependency-driven cache invalidation
//!
//! Cache entries are deleted before the index is touched. If any
//! deletion fails the index is left as it was, so every surviving
//! entry stays reachable for a later retry.

use crate::cache::{DependencyIndex, SecretCache};
use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::Fingerprint;
use crate::vault::RemoveOutcome;
use tracing::{debug, info, warn};

/// Outcome of an invalidation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// No cache entry depends on the given secret paths
    NothingToClear,
    /// These entries were removed (or were already gone)
    Cleared(Vec<Fingerprint>),
}

/// Remove every cache entry built from any of `secret_paths`
pub async fn invalidate<S: AsRef<str>>(
    cache: &SecretCache,
    index: &mut DependencyIndex,
    secret_paths: &[S],
) -> PassEnvResult<Invalidation> {
    let affected = index.dependents(secret_paths);
    if affected.is_empty() {
        debug!("No cache entries depend on the requested pass names");
        return Ok(Invalidation::NothingToClear);
    }

    let mut failures = Vec::new();
    for fingerprint in &affected {
        match cache.remove(fingerprint).await {
            Ok(RemoveOutcome::Removed) => debug!("Removed cache entry {}", fingerprint),
            Ok(RemoveOutcome::NotPresent) => {
                debug!("Cache entry {} was already gone", fingerprint)
            }
            Err(e) => failures.push(format!("failed to remove '{}': {}", fingerprint, e)),
        }
    }

    if !failures.is_empty() {
        return Err(PassEnvError::Invalidation { failures });
    }

    index.remove(secret_paths);
    if let Err(e) = index.persist().await {
        warn!("Failed to update index after clearing cache: {}", e);
    }

    info!("Cleared {} cache entries", affected.len());
    Ok(Invalidation::Cleared(affected.into_iter().collect()))
}
