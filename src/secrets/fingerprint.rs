//! Content-addressed cache keys for environment specifications
//!
//! A fingerprint is the hex SHA256 of the sorted `NAME=PASS_NAME` lines
//! of a specification. Same pairs = same key, whatever order they were
//! given in.

use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::EnvSpec;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of a hex encoded SHA256 digest
pub const FINGERPRINT_LEN: usize = 64;

/// Deterministic identifier of an `EnvSpec`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a specification
    pub fn of(spec: &EnvSpec) -> Self {
        let mut lines: Vec<String> = spec
            .iter()
            .map(|(name, path)| format!("{}={}", name, path))
            .collect();
        // Sort the rendered lines, not the names: "A1=x" < "A=x"
        lines.sort();

        let mut hasher = Sha256::new();
        for line in &lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// The hex string, as used for the cache store key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = PassEnvError;

    fn from_str(s: &str) -> PassEnvResult<Self> {
        let valid = s.len() == FINGERPRINT_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(PassEnvError::InvalidFingerprint(s.to_string()))
        }
    }
}
