//! Init command - create the state directory and cache store

use crate::cli::args::InitArgs;
use crate::config::Config;
use crate::error::{PassEnvError, PassEnvResult};
use crate::state::{self, StatePaths};
use crate::vault::PassStore;
use console::style;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Execute the init command
pub async fn execute(args: InitArgs, config: &Config, paths: StatePaths) -> PassEnvResult<()> {
    if paths.is_initialized() {
        return Err(PassEnvError::AlreadyInitialized(paths.root().to_path_buf()));
    }

    let primary = locate_pass_store(
        args.pass_store,
        std::env::var_os("PASSWORD_STORE_DIR").map(PathBuf::from),
        config.vault.password_store_dir.clone(),
        dirs::home_dir(),
    )?;
    debug!("Using pass store at {}", primary.display());

    let gpg_ids = if args.gpg.is_empty() {
        read_gpg_ids(&primary).await?
    } else {
        args.gpg
    };

    let cache_store = PassStore::new(paths.store())
        .with_program(config.vault.program.clone(), config.vault.args.clone());

    state::initialize(&paths, &cache_store, &primary, &gpg_ids).await?;

    println!(
        "{} Initialized pass-env at {}",
        style("✓").green(),
        paths.root().display()
    );
    println!("  pass store: {}", primary.display());
    println!("  gpg id(s):  {}", gpg_ids.join(", "));

    Ok(())
}

/// Pick the primary store: flag, `$PASSWORD_STORE_DIR`, config, `~/.password-store`
fn locate_pass_store(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    configured: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PassEnvResult<PathBuf> {
    let candidate = flag
        .or(env.filter(|p| !p.as_os_str().is_empty()))
        .or(configured)
        .or_else(|| home.map(|h| h.join(".password-store")))
        .ok_or_else(|| PassEnvError::PassStoreNotFound("no home directory".to_string()))?;

    if candidate.is_dir() {
        Ok(candidate)
    } else {
        Err(PassEnvError::PassStoreNotFound(
            candidate.display().to_string(),
        ))
    }
}

/// GPG ids listed in `<store>/.gpg-id`, one per line
async fn read_gpg_ids(store: &Path) -> PassEnvResult<Vec<String>> {
    let path = store.join(".gpg-id");
    let content = fs::read_to_string(&path)
        .await
        .map_err(|_| PassEnvError::GpgIdNotFound(path.clone()))?;

    let ids: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    if ids.is_empty() {
        return Err(PassEnvError::GpgIdNotFound(path));
    }
    Ok(ids)
}
