//! Configuration for the cache store.
//!
//! - Schema and builder in [`schema`]
//! - File loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use shardcache::config::CacheConfig;
//!
//! let config = CacheConfig::builder()
//!     .cache_directory("cache")
//!     .actual_cache_directory("/srv/www/cache")
//!     .shard_depth(3)
//!     .build();
//!
//! assert_eq!(config.shard_depth(), 3);
//! assert_eq!(config.actual_cache_directory().to_str(), Some("/srv/www/cache"));
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config_file, parse_config, validate};
pub use schema::{parse_mode, CacheConfig, CacheConfigBuilder};
