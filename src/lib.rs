//! shardcache - a filesystem-backed cache.
//!
//! Entries are files named by their cache key and spread over
//! single-character directories so no directory grows too large:
//! `helloworld.txt` lives at `h/e/l/l/o/helloworld.txt`. Lookups can require
//! an entry to be younger than a number of seconds or newer than other files,
//! and [`cache::CacheStore::get_or_create`] fills misses from a producer.
//!
//! # Modules
//!
//! - [`cache`] - Sharding, freshness conditions and the store
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Store configuration and YAML loading
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use shardcache::cache::shard_path;
//!
//! assert_eq!(shard_path("helloworld.txt", 5).to_str(), Some("h/e/l/l/o/helloworld.txt"));
//! assert_eq!(shard_path("xy.txt", 5).to_str(), Some("x/y/xy.txt"));
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;

pub use error::{CacheError, Result};
