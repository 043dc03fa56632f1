//! Cache command - inspect and clear cached secrets

use crate::audit::AuditLog;
use crate::cache::{DependencyIndex, Invalidation};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::{EnvSpec, Fingerprint};
use crate::state::{StateContext, StatePaths};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, paths: StatePaths) -> PassEnvResult<()> {
    match args.action {
        CacheAction::Key { pairs } => print_key(&pairs),
        CacheAction::Clear { pass_names } => {
            let audit = AuditLog::new(config, &paths);
            let mut ctx = StateContext::open(paths, &config.vault).await?;
            clear(&mut ctx, &audit, &pass_names).await
        }
        CacheAction::Index { format } => {
            let ctx = StateContext::open(paths, &config.vault).await?;
            print_index(ctx.index(), format)
        }
        CacheAction::Show { fingerprint } => {
            let fingerprint: Fingerprint = fingerprint.parse()?;
            let ctx = StateContext::open(paths, &config.vault).await?;
            show_entry(&ctx, &fingerprint).await
        }
    }
}

fn print_key(pairs: &[String]) -> PassEnvResult<()> {
    let spec = EnvSpec::from_pairs(pairs)?;
    println!("{}", spec.fingerprint());
    Ok(())
}

async fn clear(ctx: &mut StateContext, audit: &AuditLog, pass_names: &[String]) -> PassEnvResult<()> {
    match ctx.clear(pass_names).await? {
        Invalidation::NothingToClear => {
            println!("No cache entries found for the specified pass names.");
        }
        Invalidation::Cleared(fingerprints) => {
            audit
                .log(
                    "cache.cleared",
                    &serde_json::json!({
                        "secret_paths": pass_names,
                        "fingerprints": fingerprints,
                    }),
                )
                .await;

            println!(
                "{} Cleared {} cache entries for: {}",
                style("✓").green(),
                fingerprints.len(),
                pass_names.join(", ")
            );
        }
    }
    Ok(())
}

fn print_index(index: &DependencyIndex, format: OutputFormat) -> PassEnvResult<()> {
    match format {
        OutputFormat::Table => print_index_table(index),
        OutputFormat::Json => print_index_json(index)?,
        OutputFormat::Plain => print_index_plain(index),
    }
    Ok(())
}

fn print_index_table(index: &DependencyIndex) {
    if index.is_empty() {
        println!("Index is empty.");
        return;
    }

    println!("{:<40} {:<64}", "PASS NAME", "CACHE KEY");
    println!("{}", "-".repeat(105));

    for (path, fingerprints) in index.iter() {
        for (i, fp) in fingerprints.iter().enumerate() {
            let name = if i == 0 { path } else { "" };
            println!("{:<40} {}", name, style(fp).dim());
        }
    }

    println!();
    println!("Total: {} pass name(s)", index.len());
}

fn print_index_json(index: &DependencyIndex) -> PassEnvResult<()> {
    let map: std::collections::BTreeMap<&str, _> = index.iter().collect();
    let json = serde_json::to_string_pretty(&map)?;
    println!("{}", json);
    Ok(())
}

fn print_index_plain(index: &DependencyIndex) {
    for (path, fingerprints) in index.iter() {
        for fp in fingerprints {
            println!("{} {}", path, fp);
        }
    }
}

async fn show_entry(ctx: &StateContext, fingerprint: &Fingerprint) -> PassEnvResult<()> {
    let values = ctx
        .cached(fingerprint)
        .await
        .ok_or_else(|| PassEnvError::CacheMiss(fingerprint.to_string()))?;

    for (name, value) in &values {
        println!("{}={}", name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CacheMode;
    use crate::vault::MemoryStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn context(dir: &TempDir) -> StateContext {
        let primary = Arc::new(MemoryStore::with_entries([
            ("github/token", "ghp_123"),
            ("prod/db", "hunter2"),
        ]));
        StateContext::with_stores(StatePaths::new(dir.path()), primary, Arc::new(MemoryStore::new()))
            .await
    }

    fn audit(dir: &TempDir) -> AuditLog {
        AuditLog::new(&Config::default(), &StatePaths::new(dir.path()))
    }

    #[tokio::test]
    async fn clear_removes_dependents_and_audits() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir).await;
        let spec = EnvSpec::from_pairs(["TOKEN=github/token", "DB=prod/db"]).unwrap();
        let fp = ctx.resolve(&spec, CacheMode::Use).await.unwrap().fingerprint;

        clear(&mut ctx, &audit(&dir), &["prod/db".to_string()])
            .await
            .unwrap();

        assert!(ctx.cached(&fp).await.is_none());
        assert!(ctx.index().is_empty());

        let log = std::fs::read_to_string(StatePaths::new(dir.path()).audit_log()).unwrap();
        assert!(log.contains("cache.cleared"));
        assert!(log.contains(fp.as_str()));
        assert!(!log.contains("hunter2"));
    }

    #[tokio::test]
    async fn clear_with_no_dependents_is_ok() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir).await;

        clear(&mut ctx, &audit(&dir), &["unknown/path".to_string()])
            .await
            .unwrap();

        assert!(!StatePaths::new(dir.path()).audit_log().exists());
    }

    #[tokio::test]
    async fn show_reports_miss() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir).await;
        let fp = EnvSpec::from_pairs(["TOKEN=github/token"]).unwrap().fingerprint();

        let err = show_entry(&ctx, &fp).await.unwrap_err();
        assert!(matches!(err, PassEnvError::CacheMiss(_)));
    }

    #[test]
    fn key_rejects_bad_pairs() {
        assert!(print_key(&["TOKEN=github/token".to_string()]).is_ok());
        assert!(matches!(
            print_key(&["TOKEN".to_string()]),
            Err(PassEnvError::InvalidEnvPair(_))
        ));
    }
}
