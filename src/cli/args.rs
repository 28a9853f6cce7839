//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::cache::ConditionSet;
use crate::config::{load_config_file, parse_mode, CacheConfig};
use crate::error::Result;

/// shardcache - Filesystem cache with sharded directories.
#[derive(Debug, Parser)]
#[command(name = "shardcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, global = true, env = "SHARDCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Public cache root (overrides config)
    #[arg(long, global = true, env = "SHARDCACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Physical cache root, when it differs from the public one
    #[arg(long, global = true)]
    pub actual_cache_dir: Option<PathBuf>,

    /// Number of shard directory levels
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Build the store configuration: config file first, then flags.
    pub fn resolve_config(&self) -> Result<CacheConfig> {
        let base = match &self.config {
            Some(path) => load_config_file(path)?,
            None => CacheConfig::default(),
        };

        let mut builder = base.to_builder();
        if let Some(dir) = &self.cache_dir {
            builder = builder.cache_directory(dir);
        }
        if let Some(dir) = &self.actual_cache_dir {
            builder = builder.actual_cache_directory(dir);
        }
        if let Some(depth) = self.depth {
            builder = builder.shard_depth(depth);
        }

        Ok(builder.build())
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the path an entry is stored at
    Path(PathArgs),

    /// Exit 0 if an entry is cached and fresh, 1 otherwise
    Exists(LookupArgs),

    /// Print a cached entry
    Get(LookupArgs),

    /// Store an entry from a file or stdin
    Set(SetArgs),

    /// Reset permissions across the whole cache
    Chmod(ChmodArgs),
}

/// Arguments for the `path` command.
#[derive(Debug, Clone, Args)]
pub struct PathArgs {
    /// Cache key, e.g. `thumbnail.png`
    pub key: String,

    /// Print the physical path instead of the public one
    #[arg(long)]
    pub actual: bool,
}

/// Freshness conditions accepted by lookups.
#[derive(Debug, Clone, Default, Args)]
pub struct ConditionArgs {
    /// Maximum entry age in seconds (0 or less means always stale)
    #[arg(long, allow_negative_numbers = true)]
    pub max_age: Option<i64>,

    /// Entry must be at least as new as this file (repeatable)
    #[arg(long = "younger-than", value_name = "PATH")]
    pub younger_than: Vec<String>,
}

impl ConditionArgs {
    pub fn to_conditions(&self) -> ConditionSet {
        let mut conditions = ConditionSet::new();
        if let Some(secs) = self.max_age {
            conditions = conditions.max_age(secs);
        }
        for reference in &self.younger_than {
            conditions = conditions.younger_than(reference.clone());
        }
        conditions
    }
}

/// Arguments for the `exists` and `get` commands.
#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    /// Cache key
    pub key: String,

    #[command(flatten)]
    pub conditions: ConditionArgs,
}

/// Arguments for the `set` command.
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Cache key
    pub key: String,

    /// Read contents from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the `chmod` command.
#[derive(Debug, Clone, Args)]
pub struct ChmodArgs {
    /// Octal mode for directories, e.g. 755
    #[arg(long, value_parser = parse_mode_arg)]
    pub dir_mode: u32,

    /// Octal mode for files, e.g. 644
    #[arg(long, value_parser = parse_mode_arg)]
    pub file_mode: u32,
}

fn parse_mode_arg(raw: &str) -> std::result::Result<u32, String> {
    parse_mode(raw).ok_or_else(|| format!("'{}' is not an octal permission mode", raw))
}
