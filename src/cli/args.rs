//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pass-env - run commands with secrets from pass in their environment
///
/// Fetches NAME=PASS_NAME pairs from your password store, caches the
/// resolved set in pass-env's own encrypted store and runs COMMAND with
/// the values exported.
#[derive(Parser, Debug)]
#[command(name = "pass-env")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "pass-env [OPTIONS] NAME=PASS_NAME... COMMAND [ARG]...\n       pass-env [OPTIONS] <COMMAND>")]
#[command(after_help = r#"EXAMPLES:
    # Run Rails console with database password
    pass-env DB_PASSWORD=prod/database/password rails console

    # Use multiple secrets
    pass-env TOKEN=github/token SLACK_KEY=slack/webhook ./deploy.sh

    # Pass through env(1) options (-i to ignore inherited environment)
    pass-env exec -i TOKEN=github/token gh pr view -c

ENV OPTIONS:
    env(1) options such as -i are only accepted after `exec`; a leading
    option without it (pass-env -i ...) is rejected as an unknown flag.

EXIT STATUS:
    128    invalid arguments
    129    secret not found
    -      the exit status of COMMAND"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PASS_ENV_CONFIG")]
    pub config: Option<PathBuf>,

    /// State directory (cache store, index, audit log)
    #[arg(long, global = true, env = "PASS_ENV_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command with secrets injected into its environment
    Exec(ExecArgs),

    /// Initialize pass-env's internal store and state
    Init(InitArgs),

    /// Alias a set of NAME=PASS_NAME pairs
    Alias(AliasArgs),

    /// Inspect and clear cached secrets
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),

    /// NAME=PASS_NAME... COMMAND [ARG]... (shorthand for exec)
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Arguments for the exec command
#[derive(Parser, Debug)]
pub struct ExecArgs {
    /// Do not read or write the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Refetch secrets and rewrite the cache entry
    #[arg(long, conflicts_with = "no_cache")]
    pub refresh: bool,

    /// [ENV_OPTION]... NAME=PASS_NAME|ALIAS... COMMAND [ARG]...
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "ARGS"
    )]
    pub args: Vec<String>,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Use the pass store at this path instead of the default in environment variables
    #[arg(short = 's', long)]
    pub pass_store: Option<PathBuf>,

    /// Use this gpg key, instead of the one from the existing pass store
    #[arg(short, long)]
    pub gpg: Vec<String>,
}

/// Arguments for the alias command
#[derive(Parser, Debug)]
pub struct AliasArgs {
    /// Delete the given alias
    #[arg(short, long, requires = "alias")]
    pub delete: bool,

    /// Alias name (lists aliases when omitted)
    pub alias: Option<String>,

    /// NAME=PASS_NAME pairs the alias expands to
    #[arg(conflicts_with = "delete")]
    pub pairs: Vec<String>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Clear cached entries for the specified pass names
    Clear {
        /// Pass names whose dependent cache entries are removed
        #[arg(required = true, value_name = "PASS_NAME")]
        pass_names: Vec<String>,
    },

    /// Show which cache entries depend on each pass name
    Index {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the cached values for a cache key
    Show {
        /// Cache key (see `pass-env cache key`)
        fingerprint: String,
    },

    /// Print the cache key for a set of NAME=PASS_NAME pairs
    Key {
        /// NAME=PASS_NAME pairs
        #[arg(required = true, value_name = "NAME=PASS_NAME")]
        pairs: Vec<String>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
