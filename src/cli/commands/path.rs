//! `shardcache path` - show where an entry lives.

use std::io::Write;

use super::dispatcher::{Command, CommandResult};
use crate::cache::CacheStore;
use crate::cli::args::PathArgs;
use crate::error::Result;

/// The path command implementation.
pub struct PathCommand {
    args: PathArgs,
}

impl PathCommand {
    pub fn new(args: PathArgs) -> Self {
        Self { args }
    }
}

impl Command for PathCommand {
    fn execute(&self, store: &CacheStore, out: &mut dyn Write) -> Result<CommandResult> {
        let path = if self.args.actual {
            store.actual_cache_path(&self.args.key)?
        } else {
            store.cache_path(&self.args.key)?
        };

        writeln!(out, "{}", path.display())?;
        Ok(CommandResult::success())
    }
}
