//! CLI command implementations

pub mod alias;
pub mod cache;
pub mod config;
pub mod exec;
pub mod init;

pub use alias::execute as alias;
pub use cache::execute as cache;
pub use config::execute as config;
pub use exec::execute as exec;
pub use exec::external;
pub use init::execute as init;
