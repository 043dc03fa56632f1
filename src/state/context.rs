//! Per-invocation state: stores, cache and the loaded index
//!
//! The index is owned here and lent to the cache-write path and the
//! invalidation engine; nothing about it is global.

use crate::cache::{invalidate, DependencyIndex, Invalidation, SecretCache};
use crate::config::schema::VaultConfig;
use crate::error::PassEnvResult;
use crate::secrets::{EnvSpec, Fingerprint, SecretFetcher, SecretValues};
use crate::state::StatePaths;
use crate::vault::{PassStore, SecretStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a resolution uses the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache, write on a miss
    #[default]
    Use,
    /// Skip the read, always fetch and rewrite the entry
    Refresh,
    /// Neither read nor write
    Bypass,
}

/// Resolved environment for one specification
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Cache key of the specification
    pub fingerprint: Fingerprint,
    /// Variable name -> secret value
    pub values: SecretValues,
    /// Whether the values came from the cache
    pub cache_hit: bool,
}

/// Stores, cache and index for the current process
pub struct StateContext {
    paths: StatePaths,
    fetcher: SecretFetcher,
    cache: SecretCache,
    index: DependencyIndex,
}

impl StateContext {
    /// Open an initialized state directory with pass-backed stores
    pub async fn open(paths: StatePaths, vault: &VaultConfig) -> PassEnvResult<Self> {
        paths.require_initialized()?;

        let primary = PassStore::new(paths.pass_store())
            .with_program(vault.program.clone(), vault.args.clone());
        let cache = PassStore::new(paths.store())
            .with_program(vault.program.clone(), vault.args.clone());

        Ok(Self::with_stores(paths, Arc::new(primary), Arc::new(cache)).await)
    }

    /// Build a context from explicit stores, loading the index from `paths`
    pub async fn with_stores(
        paths: StatePaths,
        primary: Arc<dyn SecretStore>,
        cache: Arc<dyn SecretStore>,
    ) -> Self {
        let index = DependencyIndex::load(paths.index()).await;
        Self {
            paths,
            fetcher: SecretFetcher::new(primary),
            cache: SecretCache::new(cache),
            index,
        }
    }

    /// Resolve `spec`, consulting and maintaining the cache per `mode`
    ///
    /// Only a fetch failure is an error. Cache and index maintenance
    /// failures are logged and the resolved values are still returned.
    pub async fn resolve(&mut self, spec: &EnvSpec, mode: CacheMode) -> PassEnvResult<Resolution> {
        let fingerprint = spec.fingerprint();

        if mode == CacheMode::Use {
            if let Some(values) = self.cache.get(&fingerprint).await {
                return Ok(Resolution {
                    fingerprint,
                    values,
                    cache_hit: true,
                });
            }
        }

        let values = self.fetcher.fetch(spec).await?;

        if mode != CacheMode::Bypass {
            self.store(&fingerprint, spec, &values).await;
        }

        Ok(Resolution {
            fingerprint,
            values,
            cache_hit: false,
        })
    }

    async fn store(&mut self, fingerprint: &Fingerprint, spec: &EnvSpec, values: &SecretValues) {
        if let Err(e) = self.cache.set(fingerprint, values).await {
            warn!("failed to cache secrets: {}", e);
            return;
        }

        let secret_paths = spec.secret_paths();
        self.index.update(fingerprint, &secret_paths);
        if let Err(e) = self.index.persist().await {
            warn!("failed to update index: {}", e);
        } else {
            debug!("Indexed {} under {} pass name(s)", fingerprint, secret_paths.len());
        }
    }

    /// Clear every cache entry depending on `secret_paths`
    pub async fn clear<S: AsRef<str>>(&mut self, secret_paths: &[S]) -> PassEnvResult<Invalidation> {
        invalidate(&self.cache, &mut self.index, secret_paths).await
    }

    /// Look up a cache entry directly
    pub async fn cached(&self, fingerprint: &Fingerprint) -> Option<SecretValues> {
        self.cache.get(fingerprint).await
    }

    /// The loaded dependency index
    pub fn index(&self) -> &DependencyIndex {
        &self.index
    }

    /// State directory paths
    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PassEnvError;
    use crate::vault::{MemoryStore, RemoveOutcome};
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Cache store that rejects every write
    struct ReadOnlyStore;

    #[async_trait]
    impl SecretStore for ReadOnlyStore {
        async fn show(&self, key: &str) -> PassEnvResult<Vec<u8>> {
            Err(PassEnvError::StoreEntryNotFound(key.to_string()))
        }

        async fn insert(&self, _key: &str, _content: &[u8]) -> PassEnvResult<()> {
            Err(PassEnvError::command_exec("pass insert", "read-only file system"))
        }

        async fn remove(&self, _key: &str) -> PassEnvResult<RemoveOutcome> {
            Ok(RemoveOutcome::NotPresent)
        }

        fn backend_name(&self) -> &'static str {
            "read-only"
        }
    }

    struct Fixture {
        _dir: TempDir,
        primary: Arc<MemoryStore>,
        cache: Arc<MemoryStore>,
        ctx: StateContext,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let primary = Arc::new(MemoryStore::with_entries([
            ("services/api-key", "abc123"),
            ("prod/db", "xyz789\nextra"),
            ("github/token", "ghp_123"),
        ]));
        let cache = Arc::new(MemoryStore::new());
        let ctx = StateContext::with_stores(
            StatePaths::new(dir.path()),
            primary.clone(),
            cache.clone(),
        )
        .await;
        Fixture {
            _dir: dir,
            primary,
            cache,
            ctx,
        }
    }

    fn spec() -> EnvSpec {
        EnvSpec::from_pairs(["API_KEY=services/api-key", "DB_PASSWORD=prod/db"]).unwrap()
    }

    #[tokio::test]
    async fn miss_fetches_caches_and_indexes() {
        let mut f = fixture().await;

        let resolution = f.ctx.resolve(&spec(), CacheMode::Use).await.unwrap();

        assert!(!resolution.cache_hit);
        assert_eq!(resolution.values["API_KEY"], "abc123");
        assert_eq!(resolution.values["DB_PASSWORD"], "xyz789");
        assert!(f.cache.contains(resolution.fingerprint.as_str()));
        for path in ["services/api-key", "prod/db"] {
            assert!(f.ctx.index().dependents(&[path]).contains(&resolution.fingerprint));
        }

        let persisted = DependencyIndex::load(f.ctx.paths().index()).await;
        assert!(persisted.dependents(&["prod/db"]).contains(&resolution.fingerprint));
    }

    #[tokio::test]
    async fn second_resolution_hits_cache() {
        let mut f = fixture().await;
        f.ctx.resolve(&spec(), CacheMode::Use).await.unwrap();

        // Rotating the source does not change a cached resolution
        f.primary.insert("services/api-key", b"rotated").await.unwrap();
        let resolution = f.ctx.resolve(&spec(), CacheMode::Use).await.unwrap();

        assert!(resolution.cache_hit);
        assert_eq!(resolution.values["API_KEY"], "abc123");
    }

    #[tokio::test]
    async fn clear_after_rotation_refetches() {
        let mut f = fixture().await;
        f.ctx.resolve(&spec(), CacheMode::Use).await.unwrap();
        f.primary.insert("services/api-key", b"rotated").await.unwrap();

        let outcome = f.ctx.clear(&["services/api-key"]).await.unwrap();
        assert!(matches!(outcome, Invalidation::Cleared(ref fps) if fps.len() == 1));

        let resolution = f.ctx.resolve(&spec(), CacheMode::Use).await.unwrap();
        assert!(!resolution.cache_hit);
        assert_eq!(resolution.values["API_KEY"], "rotated");
    }

    #[tokio::test]
    async fn refresh_skips_read_but_rewrites() {
        let mut f = fixture().await;
        f.ctx.resolve(&spec(), CacheMode::Use).await.unwrap();
        f.primary.insert("prod/db", b"new-db").await.unwrap();

        let refreshed = f.ctx.resolve(&spec(), CacheMode::Refresh).await.unwrap();
        assert!(!refreshed.cache_hit);
        assert_eq!(refreshed.values["DB_PASSWORD"], "new-db");

        let cached = f.ctx.cached(&refreshed.fingerprint).await.unwrap();
        assert_eq!(cached["DB_PASSWORD"], "new-db");
    }

    #[tokio::test]
    async fn bypass_leaves_no_trace() {
        let mut f = fixture().await;

        let resolution = f.ctx.resolve(&spec(), CacheMode::Bypass).await.unwrap();

        assert!(!resolution.cache_hit);
        assert!(f.cache.is_empty());
        assert!(f.ctx.index().is_empty());
        assert!(!f.ctx.paths().index().exists());
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let mut f = fixture().await;
        let spec = EnvSpec::from_pairs([
            "API_KEY=services/api-key",
            "MISSING=nope/missing",
            "TOKEN=github/token",
        ])
        .unwrap();

        let err = f.ctx.resolve(&spec, CacheMode::Use).await.unwrap_err();

        assert!(err.to_string().contains("nope/missing"));
        assert!(f.cache.is_empty());
        assert!(f.ctx.index().is_empty());
    }

    #[tokio::test]
    async fn cache_write_failure_still_returns_values() {
        let dir = TempDir::new().unwrap();
        let primary = Arc::new(MemoryStore::with_entries([("github/token", "ghp_123")]));
        let mut ctx = StateContext::with_stores(
            StatePaths::new(dir.path()),
            primary,
            Arc::new(ReadOnlyStore),
        )
        .await;
        let spec = EnvSpec::from_pairs(["TOKEN=github/token"]).unwrap();

        let resolution = ctx.resolve(&spec, CacheMode::Use).await.unwrap();

        assert_eq!(resolution.values["TOKEN"], "ghp_123");
        // No index entry for a fingerprint that has no cache entry
        assert!(ctx.index().is_empty());
    }

    #[tokio::test]
    async fn index_write_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let primary = Arc::new(MemoryStore::with_entries([("github/token", "ghp_123")]));
        let cache = Arc::new(MemoryStore::new());
        // Index lives in a directory that does not exist
        let mut ctx = StateContext::with_stores(
            StatePaths::new(dir.path().join("missing")),
            primary,
            cache.clone(),
        )
        .await;
        let spec = EnvSpec::from_pairs(["TOKEN=github/token"]).unwrap();

        let resolution = ctx.resolve(&spec, CacheMode::Use).await.unwrap();

        assert!(cache.contains(resolution.fingerprint.as_str()));
        assert!(ctx.index().dependents(&["github/token"]).contains(&resolution.fingerprint));
    }
}
