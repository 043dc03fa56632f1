//! pass-env - run commands with secrets from pass
//!
//! Resolves NAME=PASS_NAME pairs against a password store, caches each
//! resolved set in a private store keyed by its fingerprint, and tracks
//! which secret paths every cache entry depends on so rotations can be
//! invalidated precisely.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod secrets;
pub mod state;
pub mod vault;

pub use error::{PassEnvError, PassEnvResult};
