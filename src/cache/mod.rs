//! Dependency-tracked secret cache
//!
//! Resolved environments are stored in a second password store owned by
//! pass-env, keyed by the fingerprint of the requested NAME=PASS_NAME
//! pairs. A reverse index records which secret paths each entry was built
//! from, so rotating one secret can clear exactly the entries that used it.
//!
//! # Consistency
//!
//! | Failure | Result |
//! |---------|--------|
//! | Cache write fails | Entry missing, index not updated, next run refetches |
//! | Index write fails | Entry cached but unreachable by pass name (orphan) |
//! | Entry delete fails | Index left unchanged, clear can be retried |
//! | Index corrupt on load | Empty index, rebuilt by later cache writes |

pub mod entry;
pub mod index;
pub mod invalidate;

pub use entry::SecretCache;
pub use index::DependencyIndex;
pub use invalidate::{invalidate, Invalidation};
