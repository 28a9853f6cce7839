//! Command-line interface for shardcache.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{ChmodArgs, Cli, Commands, ConditionArgs, LookupArgs, PathArgs, SetArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
