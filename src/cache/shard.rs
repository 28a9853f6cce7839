//! Key-to-path sharding.
//!
//! A key such as `helloworld.txt` sharded at depth 5 lands at
//! `h/e/l/l/o/helloworld.txt`. Only the characters before the first `.`
//! count towards the depth, so short stems shard shallower instead of
//! picking up characters from the extension.

use std::path::PathBuf;

/// Default number of single-character directory levels.
pub const DEFAULT_SHARD_DEPTH: usize = 5;

/// Derive the relative path for `key`, `depth` levels deep at most.
pub fn shard_path(key: &str, depth: usize) -> PathBuf {
    let mut path: PathBuf = shard_segments(key, depth).collect();
    path.push(key);
    path
}

/// The directory segments for `key`, without the key itself.
pub fn shard_segments(key: &str, depth: usize) -> impl Iterator<Item = String> + '_ {
    let n = stem(key).chars().count().min(depth);
    key.chars().take(n).map(String::from)
}

/// Everything before the first `.`, or the whole key when there is none.
fn stem(key: &str) -> &str {
    key.split_once('.').map_or(key, |(stem, _)| stem)
}
