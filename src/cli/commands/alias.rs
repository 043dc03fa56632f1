//! Alias command - name reusable sets of NAME=PASS_NAME pairs

use crate::cli::args::AliasArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::is_env_pair;
use console::style;
use std::path::PathBuf;

/// Execute the alias command
pub async fn execute(args: AliasArgs, config: &Config, manager: &ConfigManager) -> PassEnvResult<()> {
    let Some(name) = args.alias else {
        list_aliases(config);
        return Ok(());
    };

    let mut config = config.clone();

    if args.delete {
        if config.aliases.remove(&name).is_none() {
            return Err(PassEnvError::User(format!("No alias named '{}'", name)));
        }
        manager.save(&config).await?;
        println!("{} Deleted alias {}", style("✓").green(), name);
        return Ok(());
    }

    validate_alias(&name, &args.pairs)?;
    if let Some(program) = shadowed_command(&name) {
        eprintln!(
            "{} alias '{}' has the same name as {}; it only expands before the first NAME=PASS_NAME pair",
            style("Warning:").yellow(),
            name,
            program.display()
        );
    }
    config.aliases.insert(name.clone(), args.pairs);
    manager.save(&config).await?;
    println!("{} Saved alias {}", style("✓").green(), name);

    Ok(())
}

fn list_aliases(config: &Config) {
    if config.aliases.is_empty() {
        println!("No aliases defined.");
        return;
    }

    for (name, pairs) in &config.aliases {
        println!("{}: {}", style(name).bold(), pairs.join(" "));
    }
}

/// Check an alias name and the pairs it expands to
pub fn validate_alias(name: &str, pairs: &[String]) -> PassEnvResult<()> {
    let invalid = |reason: &str| PassEnvError::InvalidAlias {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('-') {
        return Err(invalid("name may not start with '-'"));
    }
    if name.chars().any(|c| c.is_whitespace() || c == ':' || c == '=') {
        return Err(invalid("name may not contain whitespace, ':' or '='"));
    }
    if pairs.is_empty() {
        return Err(invalid("no NAME=PASS_NAME pairs given"));
    }
    if let Some(bad) = pairs.iter().find(|p| !is_env_pair(p)) {
        return Err(invalid(&format!("'{}' is not a NAME=PASS_NAME pair", bad)));
    }

    Ok(())
}

/// Executable on PATH that an alias called `name` would be confused with
pub fn shadowed_command(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
