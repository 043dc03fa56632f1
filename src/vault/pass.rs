//! pass(1) backed secret store
//!
//! Implements the SecretStore trait by executing the `pass` CLI with
//! `PASSWORD_STORE_DIR` pointed at the store root. Two instances are
//! used at runtime: the user's store (through the `.pass-store` link)
//! and pass-env's own cache store.

use crate::error::{PassEnvError, PassEnvResult};
use crate::vault::{RemoveOutcome, SecretStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Message pass prints when a key does not exist
const NOT_IN_STORE: &str = "is not in the password store";

/// Secret store driven through the pass command-line contract
#[derive(Debug, Clone)]
pub struct PassStore {
    program: String,
    leading_args: Vec<String>,
    store_dir: PathBuf,
}

impl PassStore {
    /// Create a store rooted at `store_dir` using the `pass` binary
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "pass".to_string(),
            leading_args: vec![],
            store_dir: store_dir.into(),
        }
    }

    /// Use a different program (and leading arguments) in place of `pass`
    pub fn with_program(mut self, program: impl Into<String>, leading_args: Vec<String>) -> Self {
        self.program = program.into();
        self.leading_args = leading_args;
        self
    }

    /// Root directory of this store
    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// Initialize the store for the given GPG ids (`pass init`)
    pub async fn init(&self, gpg_ids: &[String]) -> PassEnvResult<()> {
        let mut args = vec!["init"];
        args.extend(gpg_ids.iter().map(String::as_str));

        let output = self.exec(&args, None).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PassEnvError::command_exec(
                "pass init",
                combined_output(&output),
            ))
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .env("PASSWORD_STORE_DIR", &self.store_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Execute a pass command, optionally feeding `input` on stdin
    async fn exec(&self, args: &[&str], input: Option<&[u8]>) -> PassEnvResult<Output> {
        debug!(
            "Executing: {} {:?} (PASSWORD_STORE_DIR={})",
            self.program,
            args,
            self.store_dir.display()
        );

        let display = format!("{} {}", self.program, args.first().copied().unwrap_or_default());
        let mut cmd = self.command(args);

        let Some(input) = input else {
            return cmd
                .stdin(Stdio::null())
                .output()
                .await
                .map_err(|e| PassEnvError::command_failed(display, e));
        };

        let mut child = cmd
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| PassEnvError::command_failed(display.clone(), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input)
                .await
                .map_err(|e| PassEnvError::io(format!("writing stdin of {}", display), e))?;
            // Dropping closes the pipe so pass sees EOF
            drop(stdin);
        }

        child
            .wait_with_output()
            .await
            .map_err(|e| PassEnvError::command_failed(display, e))
    }
}

/// stdout and stderr of a finished command, trimmed
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}{}", stdout, stderr).trim().to_string()
}

fn reports_missing(output: &Output) -> bool {
    combined_output(output).contains(NOT_IN_STORE)
}

#[async_trait]
impl SecretStore for PassStore {
    async fn show(&self, key: &str) -> PassEnvResult<Vec<u8>> {
        let output = self.exec(&["show", key], None).await?;

        if output.status.success() {
            Ok(output.stdout)
        } else if reports_missing(&output) {
            Err(PassEnvError::StoreEntryNotFound(key.to_string()))
        } else {
            Err(PassEnvError::command_exec(
                format!("pass show {}", key),
                combined_output(&output),
            ))
        }
    }

    async fn insert(&self, key: &str, content: &[u8]) -> PassEnvResult<()> {
        let output = self
            .exec(&["insert", "-m", "-f", key], Some(content))
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PassEnvError::command_exec(
                format!("pass insert {}", key),
                combined_output(&output),
            ))
        }
    }

    async fn remove(&self, key: &str) -> PassEnvResult<RemoveOutcome> {
        let output = self.exec(&["rm", "-f", key], None).await?;

        if output.status.success() {
            Ok(RemoveOutcome::Removed)
        } else if reports_missing(&output) {
            debug!("{} already absent from {}", key, self.store_dir.display());
            Ok(RemoveOutcome::NotPresent)
        } else {
            Err(PassEnvError::command_exec(
                format!("pass rm {}", key),
                combined_output(&output),
            ))
        }
    }

    fn backend_name(&self) -> &'static str {
        "pass"
    }
}
