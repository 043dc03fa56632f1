//! Exec command - run a command with resolved secrets in its environment

use crate::audit::AuditLog;
use crate::cli::args::ExecArgs;
use crate::cli::invocation::Invocation;
use crate::config::Config;
use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::SecretValues;
use crate::state::{CacheMode, StateContext, StatePaths};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info};

/// Execute the exec command, returning the child's exit status
pub async fn execute(args: ExecArgs, config: &Config, paths: StatePaths) -> PassEnvResult<u8> {
    let mode = if args.no_cache {
        CacheMode::Bypass
    } else if args.refresh {
        CacheMode::Refresh
    } else {
        CacheMode::Use
    };

    run(&args.args, mode, config, paths).await
}

/// Bare `pass-env NAME=PASS_NAME... COMMAND` form
pub async fn external(args: Vec<String>, config: &Config, paths: StatePaths) -> PassEnvResult<u8> {
    run(&args, CacheMode::Use, config, paths).await
}

async fn run(args: &[String], mode: CacheMode, config: &Config, paths: StatePaths) -> PassEnvResult<u8> {
    let invocation = Invocation::parse(args, &config.aliases)?;
    let audit = AuditLog::new(config, &paths);

    let mut ctx = StateContext::open(paths, &config.vault).await?;
    let resolution = ctx.resolve(&invocation.spec, mode).await?;

    info!(
        "Resolved {} variable(s) ({})",
        resolution.values.len(),
        if resolution.cache_hit { "cached" } else { "fetched" }
    );

    audit
        .log(
            "secrets.resolved",
            &serde_json::json!({
                "fingerprint": resolution.fingerprint,
                "names": resolution.values.keys().collect::<Vec<_>>(),
                "secret_paths": invocation.spec.secret_paths(),
                "cache_hit": resolution.cache_hit,
            }),
        )
        .await;

    let status = spawn_and_wait(&invocation, &resolution.values).await?;
    Ok(exit_status_code(status))
}

/// Build the child process for `invocation`
///
/// With env options the command goes through env(1) so options such as
/// `-i` apply before the variables are set.
fn build_command(invocation: &Invocation, values: &SecretValues) -> Command {
    if invocation.env_opts.is_empty() {
        let mut cmd = Command::new(&invocation.command[0]);
        cmd.args(&invocation.command[1..]).envs(values);
        cmd
    } else {
        let mut cmd = Command::new("env");
        cmd.args(&invocation.env_opts)
            .args(values.iter().map(|(name, value)| format!("{}={}", name, value)))
            .args(&invocation.command);
        cmd
    }
}

async fn spawn_and_wait(invocation: &Invocation, values: &SecretValues) -> PassEnvResult<ExitStatus> {
    let program = invocation.command.join(" ");
    debug!("Running: {}", program);

    let mut child = build_command(invocation, values)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| PassEnvError::command_failed(&program, e))?;

    // The terminal delivers Ctrl-C to the child as well; keep waiting for it
    loop {
        tokio::select! {
            status = child.wait() => {
                return status.map_err(|e| PassEnvError::command_failed(&program, e));
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupt received, waiting for child to exit");
            }
        }
    }
}

/// Map a child's exit status to our own, 128 + signal when killed
fn exit_status_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return code as u8;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return (128 + signal) as u8;
        }
    }

    1
}
