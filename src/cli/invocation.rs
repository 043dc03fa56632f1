//! Splitting a raw exec argument list into env options, pairs and command

use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::{is_env_pair, EnvSpec};
use std::collections::BTreeMap;

/// `[ENV_OPTION]... NAME=PASS_NAME|ALIAS... COMMAND [ARG]...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Options forwarded to env(1)
    pub env_opts: Vec<String>,
    /// Requested variables
    pub spec: EnvSpec,
    /// Command and its arguments
    pub command: Vec<String>,
}

impl Invocation {
    /// Parse `args`, expanding alias names found in the pair position
    ///
    /// Leading words starting with `-` are env options. Aliases come next,
    /// then explicit pairs; once a pair has been seen a word is only
    /// consumed if it is a pair, so `TOKEN=a/b gh pr` runs `gh` even when
    /// an alias named `gh` exists. The first word not consumed starts the
    /// command.
    pub fn parse(args: &[String], aliases: &BTreeMap<String, Vec<String>>) -> PassEnvResult<Self> {
        let mut rest = args.iter().peekable();

        let mut env_opts = Vec::new();
        while let Some(arg) = rest.next_if(|a| a.starts_with('-')) {
            env_opts.push(arg.clone());
        }

        let mut spec = EnvSpec::new();
        let mut seen_pair = false;
        while let Some(arg) = rest.peek() {
            if is_env_pair(arg) {
                spec.extend(EnvSpec::from_pairs([arg.as_str()])?);
                seen_pair = true;
            } else if let Some(pairs) = aliases.get(arg.as_str()).filter(|_| !seen_pair) {
                spec.extend(EnvSpec::from_pairs(pairs).map_err(|e| PassEnvError::InvalidAlias {
                    name: arg.to_string(),
                    reason: e.to_string(),
                })?);
            } else {
                break;
            }
            rest.next();
        }

        let command: Vec<String> = rest.cloned().collect();

        if spec.is_empty() {
            return Err(PassEnvError::InvalidArgs(
                "no NAME=PASS_NAME pairs provided".to_string(),
            ));
        }
        if command.is_empty() {
            return Err(PassEnvError::InvalidArgs("no command provided".to_string()));
        }

        Ok(Self {
            env_opts,
            spec,
            command,
        })
    }
}
