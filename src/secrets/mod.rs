//! Secret selection, fingerprinting and resolution

pub mod fetch;
pub mod fingerprint;
pub mod spec;

pub use fetch::SecretFetcher;
pub use fingerprint::Fingerprint;
pub use spec::{is_env_pair, parse_env_pair, EnvSpec, SecretValues};
