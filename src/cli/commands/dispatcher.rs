//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;

use crate::cache::CacheStore;
use crate::cli::args::Commands;
use crate::error::Result;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command against `store`, writing output to `out`.
    fn execute(&self, store: &CacheStore, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    store: CacheStore,
}

impl CommandDispatcher {
    /// Create a new dispatcher over `store`.
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Route the subcommand to its implementation and execute it.
    pub fn dispatch(&self, command: &Commands, out: &mut dyn Write) -> Result<CommandResult> {
        match command {
            Commands::Path(args) => {
                super::path::PathCommand::new(args.clone()).execute(&self.store, out)
            }
            Commands::Exists(args) => {
                super::lookup::ExistsCommand::new(args.clone()).execute(&self.store, out)
            }
            Commands::Get(args) => {
                super::lookup::GetCommand::new(args.clone()).execute(&self.store, out)
            }
            Commands::Set(args) => {
                super::set::SetCommand::new(args.clone()).execute(&self.store, out)
            }
            Commands::Chmod(args) => {
                super::chmod::ChmodCommand::new(args.clone()).execute(&self.store, out)
            }
        }
    }
}
