//! Command-line interface

pub mod args;
pub mod commands;
pub mod invocation;

pub use args::{Cli, Commands};
pub use invocation::Invocation;
