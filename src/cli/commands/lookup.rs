//! `shardcache exists` and `shardcache get`.

use std::io::Write;

use super::dispatcher::{Command, CommandResult};
use crate::cache::CacheStore;
use crate::cli::args::LookupArgs;
use crate::error::Result;

/// Exit code for a missing or stale entry.
const NOT_CACHED: i32 = 1;

/// The exists command implementation.
pub struct ExistsCommand {
    args: LookupArgs,
}

impl ExistsCommand {
    pub fn new(args: LookupArgs) -> Self {
        Self { args }
    }
}

impl Command for ExistsCommand {
    fn execute(&self, store: &CacheStore, _out: &mut dyn Write) -> Result<CommandResult> {
        let conditions = self.args.conditions.to_conditions();
        if store.exists(&self.args.key, &conditions)? {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(NOT_CACHED))
        }
    }
}

/// The get command implementation.
pub struct GetCommand {
    args: LookupArgs,
}

impl GetCommand {
    pub fn new(args: LookupArgs) -> Self {
        Self { args }
    }
}

impl Command for GetCommand {
    fn execute(&self, store: &CacheStore, out: &mut dyn Write) -> Result<CommandResult> {
        let conditions = self.args.conditions.to_conditions();
        match store.get(&self.args.key, &conditions)? {
            Some(contents) => {
                out.write_all(&contents)?;
                out.flush()?;
                Ok(CommandResult::success())
            }
            None => {
                tracing::debug!("{} is not cached", self.args.key);
                Ok(CommandResult::failure(NOT_CACHED))
            }
        }
    }
}
