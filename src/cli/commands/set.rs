//! `shardcache set` - store an entry.

use anyhow::Context;
use std::fs;
use std::io::{Read, Write};

use super::dispatcher::{Command, CommandResult};
use crate::cache::CacheStore;
use crate::cli::args::SetArgs;
use crate::error::Result;

/// The set command implementation.
pub struct SetCommand {
    args: SetArgs,
}

impl SetCommand {
    pub fn new(args: SetArgs) -> Self {
        Self { args }
    }

    fn read_contents(&self) -> anyhow::Result<Vec<u8>> {
        match &self.args.file {
            Some(path) => {
                fs::read(path).with_context(|| format!("Failed to read input file {:?}", path))
            }
            None => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .context("Failed to read contents from stdin")?;
                Ok(buf)
            }
        }
    }
}

impl Command for SetCommand {
    fn execute(&self, store: &CacheStore, _out: &mut dyn Write) -> Result<CommandResult> {
        let contents = self.read_contents()?;
        store.set(&self.args.key, &contents)?;
        tracing::info!("Stored {} ({} bytes)", self.args.key, contents.len());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ConditionSet;
    use crate::config::CacheConfig;
    use crate::error::CacheError;
    use tempfile::TempDir;

    #[test]
    fn stores_file_contents() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("input.bin");
        fs::write(&input, b"payload").unwrap();

        let store = CacheStore::new(
            CacheConfig::builder()
                .cache_directory(temp.path().join("cache"))
                .build(),
        );
        let cmd = SetCommand::new(SetArgs {
            key: "payload.bin".into(),
            file: Some(input),
        });

        let result = cmd.execute(&store, &mut Vec::new()).unwrap();
        assert!(result.success);
        assert_eq!(
            store.get("payload.bin", &ConditionSet::new()).unwrap(),
            Some(b"payload".to_vec())
        );
    }

    #[test]
    fn missing_input_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = CacheStore::new(CacheConfig::builder().cache_directory(temp.path()).build());
        let cmd = SetCommand::new(SetArgs {
            key: "a.txt".into(),
            file: Some(temp.path().join("nope")),
        });

        let err = cmd.execute(&store, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CacheError::Other(_)));
        assert!(err.to_string().contains("Failed to read input file"));
    }
}
