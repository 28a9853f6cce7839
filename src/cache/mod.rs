//! Filesystem-backed cache.
//!
//! Keys are file names. Each entry is stored under a few single-character
//! directories taken from the key ([`shard`]), checked against freshness
//! conditions ([`conditions`]) and managed by [`CacheStore`].
//!
//! # Example
//!
//! ```
//! use shardcache::cache::{CacheStore, ConditionSet};
//! use shardcache::config::CacheConfig;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let store = CacheStore::new(CacheConfig::builder().cache_directory(temp.path()).build());
//!
//! let page = store
//!     .get_or_create::<_, shardcache::CacheError>("index.html", &ConditionSet::new().max_age(60), |_| {
//!         Ok("<h1>hello</h1>".into())
//!     })
//!     .unwrap();
//!
//! assert_eq!(page, b"<h1>hello</h1>");
//! assert!(temp.path().join("i/n/d/e/x/index.html").exists());
//! ```

pub mod clock;
pub mod conditions;
pub mod fs;
pub mod shard;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conditions::{Condition, ConditionEvaluator, ConditionSet, ConditionValue};
pub use fs::{Filesystem, OsFilesystem, TreeNode};
pub use shard::{shard_path, DEFAULT_SHARD_DEPTH};
pub use store::{CacheStore, Fetched, Output, Produced};
