//! `shardcache chmod` - bulk permission remediation.

use std::io::Write;

use super::dispatcher::{Command, CommandResult};
use crate::cache::CacheStore;
use crate::cli::args::ChmodArgs;
use crate::error::Result;

/// The chmod command implementation.
pub struct ChmodCommand {
    args: ChmodArgs,
}

impl ChmodCommand {
    pub fn new(args: ChmodArgs) -> Self {
        Self { args }
    }
}

impl Command for ChmodCommand {
    fn execute(&self, store: &CacheStore, out: &mut dyn Write) -> Result<CommandResult> {
        let updated = store.chmod(self.args.dir_mode, self.args.file_mode)?;
        writeln!(
            out,
            "Updated {} paths under {}",
            updated,
            store.config().actual_cache_directory().display()
        )?;
        Ok(CommandResult::success())
    }
}
