//! pass-env state directory
//!
//! ```text
//! <state>/
//!   store/        pass-env's own password store (cache entries)
//!   .pass-store   symlink to the user's password store
//!   store.index   dependency index
//!   audit.log     JSON lines audit trail
//! ```

pub mod context;

pub use context::{CacheMode, Resolution, StateContext};

use crate::cache::DependencyIndex;
use crate::error::{PassEnvError, PassEnvResult};
use crate::vault::PassStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Well-known locations inside the state directory
#[derive(Debug, Clone)]
pub struct StatePaths {
    root: PathBuf,
}

impl StatePaths {
    /// Paths rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The state directory itself
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the cache password store
    pub fn store(&self) -> PathBuf {
        self.root.join("store")
    }

    /// Link to the primary password store
    pub fn pass_store(&self) -> PathBuf {
        self.root.join(".pass-store")
    }

    /// Dependency index file
    pub fn index(&self) -> PathBuf {
        self.root.join("store.index")
    }

    /// Audit log file
    pub fn audit_log(&self) -> PathBuf {
        self.root.join("audit.log")
    }

    /// Whether `init` has completed for this state directory
    pub fn is_initialized(&self) -> bool {
        let linked = std::fs::symlink_metadata(self.pass_store())
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);

        self.root.is_dir() && self.store().is_dir() && self.index().is_file() && linked
    }

    /// Fail unless the state directory is initialized
    pub fn require_initialized(&self) -> PassEnvResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(PassEnvError::NotInitialized(self.root.clone()))
        }
    }
}

/// Create the state directory, the cache store, the link to the primary
/// store and an empty index
pub async fn initialize(
    paths: &StatePaths,
    cache_store: &PassStore,
    primary_store: &Path,
    gpg_ids: &[String],
) -> PassEnvResult<()> {
    if paths.is_initialized() {
        return Err(PassEnvError::AlreadyInitialized(paths.root().to_path_buf()));
    }

    fs::create_dir_all(paths.root()).await.map_err(|e| {
        PassEnvError::io(format!("creating directory {}", paths.root().display()), e)
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        fs::set_permissions(paths.root(), perms)
            .await
            .map_err(|e| PassEnvError::io("setting state dir permissions", e))?;
    }

    debug!("Initializing cache store at {}", cache_store.store_dir().display());
    cache_store.init(gpg_ids).await?;

    link_primary_store(paths, primary_store).await?;

    DependencyIndex::empty(paths.index()).persist().await?;

    info!(
        "Initialized pass-env at {} for {}",
        paths.root().display(),
        primary_store.display()
    );
    Ok(())
}

#[cfg(unix)]
async fn link_primary_store(paths: &StatePaths, primary_store: &Path) -> PassEnvResult<()> {
    let link = paths.pass_store();

    // Left behind by an interrupted init
    if let Ok(meta) = fs::symlink_metadata(&link).await {
        if meta.file_type().is_symlink() {
            fs::remove_file(&link)
                .await
                .map_err(|e| PassEnvError::io(format!("removing stale link {}", link.display()), e))?;
        }
    }

    fs::symlink(primary_store, &link).await.map_err(|e| {
        PassEnvError::io(
            format!(
                "Failed to create link ('{}') to pass store '{}'",
                link.display(),
                primary_store.display()
            ),
            e,
        )
    })
}

#[cfg(not(unix))]
async fn link_primary_store(_paths: &StatePaths, _primary_store: &Path) -> PassEnvResult<()> {
    Err(PassEnvError::User(
        "linking the password store requires a unix platform".to_string(),
    ))
}
