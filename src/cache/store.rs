//! Cache storage implementation.

use std::path::{Path, PathBuf};

use super::clock::{Clock, SystemClock};
use super::conditions::{ConditionEvaluator, ConditionSet};
use super::fs::{Filesystem, OsFilesystem};
use super::shard::shard_path;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// What a producer did on a cache miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Produced {
    /// The producer wrote the entry at the path it was handed.
    Written,
    /// The producer returned the content; the store persists it.
    Returned(Vec<u8>),
}

impl From<Vec<u8>> for Produced {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Returned(bytes)
    }
}

impl From<String> for Produced {
    fn from(text: String) -> Self {
        Self::Returned(text.into_bytes())
    }
}

impl From<&str> for Produced {
    fn from(text: &str) -> Self {
        Self::Returned(text.as_bytes().to_vec())
    }
}

/// What [`CacheStore::get_or_create_with`] hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// The entry's bytes.
    Contents,
    /// The entry's path under the public cache root.
    PublicPath,
    /// The entry's path under the actual cache root.
    ActualPath,
}

/// Result of [`CacheStore::get_or_create_with`], shaped by [`Output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Contents(Vec<u8>),
    Path(PathBuf),
}

impl Fetched {
    pub fn into_contents(self) -> Option<Vec<u8>> {
        match self {
            Self::Contents(bytes) => Some(bytes),
            Self::Path(_) => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Path(path) => Some(path),
            Self::Contents(_) => None,
        }
    }
}

/// File-backed cache keyed by file names, sharded into
/// single-character directories.
///
/// No locking is done: two callers missing on the same key will both run
/// their producers and the last write wins.
pub struct CacheStore {
    config: CacheConfig,
    fs: Box<dyn Filesystem>,
    clock: Box<dyn Clock>,
}

impl CacheStore {
    /// Create a store on the local filesystem with the wall clock.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            fs: Box::new(OsFilesystem),
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the filesystem collaborator.
    pub fn with_filesystem(mut self, fs: impl Filesystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    /// Replace the clock used for `max-age` checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Path of `key` under the public cache root.
    pub fn cache_path(&self, key: &str) -> Result<PathBuf> {
        self.path_under(self.config.cache_directory(), key)
    }

    /// Path of `key` under the actual cache root, where the file lives.
    pub fn actual_cache_path(&self, key: &str) -> Result<PathBuf> {
        self.path_under(self.config.actual_cache_directory(), key)
    }

    fn path_under(&self, root: &Path, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(root.join(shard_path(key, self.config.shard_depth())))
    }

    /// Whether `key` is cached and satisfies `conditions` merged over the
    /// store's default conditions.
    pub fn exists(&self, key: &str, conditions: &ConditionSet) -> Result<bool> {
        let path = self.actual_cache_path(key)?;
        self.is_fresh(&path, conditions)
    }

    fn is_fresh(&self, path: &Path, conditions: &ConditionSet) -> Result<bool> {
        let conditions = conditions.merged_over(self.config.default_conditions());
        ConditionEvaluator::new(self.fs.as_ref(), self.clock.as_ref()).is_fresh(path, &conditions)
    }

    /// The cached bytes for `key`, or `None` when missing or stale.
    pub fn get(&self, key: &str, conditions: &ConditionSet) -> Result<Option<Vec<u8>>> {
        let path = self.actual_cache_path(key)?;
        if !self.is_fresh(&path, conditions)? {
            return Ok(None);
        }
        Ok(Some(self.fs.read_all(&path)?))
    }

    /// Store `contents` under `key`, replacing any existing entry.
    pub fn set(&self, key: &str, contents: impl AsRef<[u8]>) -> Result<()> {
        let path = self.actual_cache_path(key)?;
        self.ensure_parent(&path)?;
        self.fs.write_all(&path, contents.as_ref())?;
        self.apply_file_mode(&path)?;
        tracing::debug!("Cached {} ({} bytes)", key, contents.as_ref().len());
        Ok(())
    }

    /// Alias of [`CacheStore::set`].
    pub fn write(&self, key: &str, contents: impl AsRef<[u8]>) -> Result<()> {
        self.set(key, contents)
    }

    /// Return the cached bytes for `key`, running `producer` on a miss.
    ///
    /// Errors from the producer come back unchanged.
    pub fn get_or_create<F, E>(
        &self,
        key: &str,
        conditions: &ConditionSet,
        producer: F,
    ) -> std::result::Result<Vec<u8>, E>
    where
        F: FnOnce(&Path) -> std::result::Result<Produced, E>,
        E: From<CacheError>,
    {
        let (actual, produced) = self.fill(key, conditions, producer)?;
        Ok(self.contents_of(&actual, produced)?)
    }

    /// Like [`CacheStore::get_or_create`], returning the entry's public path.
    pub fn get_or_create_file<F, E>(
        &self,
        key: &str,
        conditions: &ConditionSet,
        producer: F,
    ) -> std::result::Result<PathBuf, E>
    where
        F: FnOnce(&Path) -> std::result::Result<Produced, E>,
        E: From<CacheError>,
    {
        self.fill(key, conditions, producer)?;
        Ok(self.cache_path(key)?)
    }

    /// Return the entry for `key` in the shape `output` asks for, running
    /// `producer` with the actual path when the entry is missing or stale.
    ///
    /// The shard directory exists by the time the producer runs, so it can
    /// stream straight to the path instead of returning the bytes.
    pub fn get_or_create_with<F, E>(
        &self,
        key: &str,
        conditions: &ConditionSet,
        output: Output,
        producer: F,
    ) -> std::result::Result<Fetched, E>
    where
        F: FnOnce(&Path) -> std::result::Result<Produced, E>,
        E: From<CacheError>,
    {
        let (actual, produced) = self.fill(key, conditions, producer)?;

        let fetched = match output {
            Output::Contents => Fetched::Contents(self.contents_of(&actual, produced)?),
            Output::PublicPath => Fetched::Path(self.cache_path(key)?),
            Output::ActualPath => Fetched::Path(actual),
        };

        Ok(fetched)
    }

    /// Make sure a fresh entry exists for `key`.
    ///
    /// Returns the actual path and, when the producer handed back bytes,
    /// those bytes so they need not be read again.
    fn fill<F, E>(
        &self,
        key: &str,
        conditions: &ConditionSet,
        producer: F,
    ) -> std::result::Result<(PathBuf, Option<Vec<u8>>), E>
    where
        F: FnOnce(&Path) -> std::result::Result<Produced, E>,
        E: From<CacheError>,
    {
        let actual = self.actual_cache_path(key)?;

        if self.is_fresh(&actual, conditions)? {
            tracing::debug!("Cache hit for {}", key);
            return Ok((actual, None));
        }

        tracing::debug!("Cache miss for {}", key);
        self.discard_stale(&actual);
        self.ensure_parent(&actual)?;

        let produced = match producer(&actual)? {
            Produced::Returned(bytes) => {
                self.fs
                    .write_all(&actual, &bytes)
                    .map_err(CacheError::from)?;
                self.apply_file_mode(&actual)?;
                Some(bytes)
            }
            Produced::Written => {
                if !self.fs.is_file(&actual) {
                    return Err(CacheError::ProducerWroteNothing { path: actual }.into());
                }
                self.apply_file_mode(&actual)?;
                None
            }
        };

        Ok((actual, produced))
    }

    fn contents_of(&self, actual: &Path, produced: Option<Vec<u8>>) -> Result<Vec<u8>> {
        match produced {
            Some(bytes) => Ok(bytes),
            None => Ok(self.fs.read_all(actual)?),
        }
    }

    /// Apply `dir_mode` to every directory and `file_mode` to every file
    /// under the actual cache root, the root included.
    ///
    /// Returns the number of paths updated.
    pub fn chmod(&self, dir_mode: u32, file_mode: u32) -> Result<usize> {
        let root = self.config.actual_cache_directory();
        if !self.fs.exists(root) {
            return Ok(0);
        }

        // Collect first: a restrictive dir mode could stop the walk halfway.
        let nodes = self.fs.list_tree(root)?;

        self.fs.set_permissions(root, dir_mode)?;
        for node in &nodes {
            let mode = if node.is_dir { dir_mode } else { file_mode };
            self.fs.set_permissions(&node.path, mode)?;
        }

        tracing::debug!("Updated permissions on {} paths", nodes.len() + 1);
        Ok(nodes.len() + 1)
    }

    fn discard_stale(&self, path: &Path) {
        if !self.fs.is_file(path) {
            return;
        }
        if let Err(e) = self.fs.remove(path) {
            tracing::warn!("Failed to remove stale cache entry {:?}: {}", path, e);
        }
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !self.fs.exists(parent) {
                self.fs.make_dirs(parent, self.config.directory_mode())?;
            }
        }
        Ok(())
    }

    fn apply_file_mode(&self, path: &Path) -> Result<()> {
        if let Some(mode) = self.config.file_mode() {
            self.fs.set_permissions(path, mode)?;
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "must not be empty"
    } else if key == "." || key == ".." {
        "must not be a relative directory"
    } else if key.contains(['/', '\\']) {
        "must not contain path separators"
    } else {
        return Ok(());
    };

    Err(CacheError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}
