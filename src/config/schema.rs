//! Configuration schema for a cache store.
//!
//! Maps to the YAML file format read by [`super::load_config_file`]:
//!
//! ```yaml
//! cache-directory: cache
//! actual-cache-directory: /var/www/cache
//! shard-depth: 5
//! default-conditions:
//!   max-age: 86400
//! directory-mode: "0755"
//! file-mode: "0644"
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::cache::shard::DEFAULT_SHARD_DEPTH;
use crate::cache::ConditionSet;

/// Immutable configuration for a [`crate::cache::CacheStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Root reported to callers, e.g. when building URLs.
    cache_directory: PathBuf,

    /// Root actually used on disk. Falls back to `cache_directory`.
    #[serde(skip_serializing_if = "Option::is_none")]
    actual_cache_directory: Option<PathBuf>,

    /// Number of single-character directory levels.
    shard_depth: usize,

    /// Conditions applied to every lookup unless overridden per call.
    #[serde(skip_serializing_if = "ConditionSet::is_empty")]
    default_conditions: ConditionSet,

    /// Permission bits for created directories.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_mode",
        deserialize_with = "deserialize_mode"
    )]
    directory_mode: Option<u32>,

    /// Permission bits applied to written entries.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_mode",
        deserialize_with = "deserialize_mode"
    )]
    file_mode: Option<u32>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: PathBuf::from("cache"),
            actual_cache_directory: None,
            shard_depth: DEFAULT_SHARD_DEPTH,
            default_conditions: ConditionSet::new(),
            directory_mode: None,
            file_mode: None,
        }
    }
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Start a builder from this configuration, for layering overrides.
    pub fn to_builder(&self) -> CacheConfigBuilder {
        CacheConfigBuilder {
            config: self.clone(),
        }
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn actual_cache_directory(&self) -> &Path {
        self.actual_cache_directory
            .as_deref()
            .unwrap_or(&self.cache_directory)
    }

    pub fn shard_depth(&self) -> usize {
        self.shard_depth
    }

    pub fn default_conditions(&self) -> &ConditionSet {
        &self.default_conditions
    }

    pub fn directory_mode(&self) -> Option<u32> {
        self.directory_mode
    }

    pub fn file_mode(&self) -> Option<u32> {
        self.file_mode
    }
}

/// Builds a [`CacheConfig`].
#[derive(Debug, Clone, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn cache_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_directory = dir.into();
        self
    }

    pub fn actual_cache_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.actual_cache_directory = Some(dir.into());
        self
    }

    /// Set the shard depth. Non-positive values are ignored and the
    /// previous depth is kept.
    pub fn shard_depth(mut self, depth: i64) -> Self {
        match usize::try_from(depth) {
            Ok(depth) if depth > 0 => self.config.shard_depth = depth,
            _ => tracing::warn!(
                "Ignoring shard depth {}, keeping {}",
                depth,
                self.config.shard_depth
            ),
        }
        self
    }

    pub fn default_conditions(mut self, conditions: ConditionSet) -> Self {
        self.config.default_conditions = conditions;
        self
    }

    pub fn directory_mode(mut self, mode: u32) -> Self {
        self.config.directory_mode = Some(mode);
        self
    }

    pub fn file_mode(mut self, mode: u32) -> Self {
        self.config.file_mode = Some(mode);
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Parse octal permission bits such as `755`, `0755` or `0o755`.
pub fn parse_mode(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw.strip_prefix("0o").unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
}

fn serialize_mode<S: Serializer>(mode: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match mode {
        Some(mode) => serializer.serialize_str(&format!("{:04o}", mode)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|raw| {
        parse_mode(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid permission mode '{}'", raw))
        })
    })
    .transpose()
}
