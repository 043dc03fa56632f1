//! pass-env - run commands with secrets from pass in their environment
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use pass_env::cli::{commands, Cli, Commands};
use pass_env::config::{Config, ConfigManager};
use pass_env::error::PassEnvResult;
use pass_env::state::StatePaths;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> PassEnvResult<u8> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.config.clone());
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    let paths = StatePaths::new(
        cli.state_dir
            .clone()
            .unwrap_or_else(ConfigManager::default_state_dir),
    );
    debug!("Using state directory {}", paths.root().display());

    match cli.command {
        Commands::Exec(args) => commands::exec(args, &config, paths).await,
        Commands::External(args) => commands::external(args, &config, paths).await,
        Commands::Init(args) => commands::init(args, &config, paths).await.map(|()| 0),
        Commands::Alias(args) => commands::alias(args, &config, &config_manager)
            .await
            .map(|()| 0),
        Commands::Cache(args) => commands::cache(args, &config, paths).await.map(|()| 0),
        Commands::Config(args) => commands::config(args, &config, &config_manager)
            .await
            .map(|()| 0),
    }
}

/// 0 = warn, 1 = info, 2+ = debug; always on stderr
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("pass_env=warn"),
        1 => EnvFilter::new("pass_env=info"),
        _ => EnvFilter::new("pass_env=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if config.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}
