//! Environment specifications: which secret feeds which variable

use crate::error::{PassEnvError, PassEnvResult};
use crate::secrets::Fingerprint;
use std::collections::BTreeMap;

/// Resolved variable name -> secret value mapping
pub type SecretValues = BTreeMap<String, String>;

/// A set of NAME=PASS_NAME pairs requested for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSpec {
    pairs: BTreeMap<String, String>,
}

impl EnvSpec {
    /// Create an empty specification
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a specification from `NAME=PASS_NAME` strings
    ///
    /// Later pairs override earlier ones with the same name.
    pub fn from_pairs<I, S>(pairs: I) -> PassEnvResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spec = Self::new();
        for pair in pairs {
            let (name, path) = parse_env_pair(pair.as_ref())?;
            spec.insert(name, path);
        }
        Ok(spec)
    }

    /// Add a pair, returning the secret path previously mapped to `name`
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.pairs.insert(name.into(), path.into())
    }

    /// Merge every pair of `other` into this specification
    pub fn extend(&mut self, other: EnvSpec) {
        self.pairs.extend(other.pairs);
    }

    /// Iterate `(name, secret path)` pairs ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, p)| (n.as_str(), p.as_str()))
    }

    /// Distinct secret paths referenced by this specification
    pub fn secret_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.pairs.values().cloned().collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pairs were requested
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Cache key for this specification
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}

impl<N: Into<String>, P: Into<String>> FromIterator<(N, P)> for EnvSpec {
    fn from_iter<T: IntoIterator<Item = (N, P)>>(iter: T) -> Self {
        let mut spec = Self::new();
        for (name, path) in iter {
            spec.insert(name, path);
        }
        spec
    }
}

/// Whether `s` has the shape `NAME=PASS_NAME` with both sides non-empty
pub fn is_env_pair(s: &str) -> bool {
    matches!(s.split_once('='), Some((name, path)) if !name.is_empty() && !path.is_empty())
}

/// Split a `NAME=PASS_NAME` string into its parts
pub fn parse_env_pair(s: &str) -> PassEnvResult<(String, String)> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), path.to_string()))
        }
        _ => Err(PassEnvError::InvalidEnvPair(s.to_string())),
    }
}
