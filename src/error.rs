//! Error types for shardcache operations.
//!
//! This module defines [`CacheError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Filesystem errors surface as `CacheError::Io` without retries
//! - Bad conditions are fatal to the operation that evaluates them
//! - Producer errors are never wrapped; see [`crate::cache::CacheStore::get_or_create`]

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A condition kind that the evaluator does not know.
    #[error("Cache condition '{kind}' is not supported")]
    UnsupportedCondition { kind: String },

    /// A known condition kind with a value of the wrong shape.
    #[error("Invalid value for cache condition '{kind}': {message}")]
    InvalidConditionValue { kind: String, message: String },

    /// A key that cannot be used as a file name inside the cache root.
    #[error("Invalid cache key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A producer claimed to write the entry but left nothing behind.
    #[error("Producer reported writing {path} but no file exists there")]
    ProducerWroteNothing { path: PathBuf },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_condition_displays_kind() {
        let err = CacheError::UnsupportedCondition {
            kind: "bogus".into(),
        };
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn invalid_condition_value_displays_kind_and_message() {
        let err = CacheError::InvalidConditionValue {
            kind: "max-age".into(),
            message: "expected seconds".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("max-age"));
        assert!(msg.contains("expected seconds"));
    }

    #[test]
    fn producer_wrote_nothing_displays_path() {
        let err = CacheError::ProducerWroteNothing {
            path: PathBuf::from("/cache/a/a.txt"),
        };
        assert!(err.to_string().contains("/cache/a/a.txt"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = CacheError::ConfigParseError {
            path: PathBuf::from("/cache.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cache.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CacheError = io_err.into();
        assert!(matches!(err, CacheError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(CacheError::InvalidKey {
                key: String::new(),
                reason: "empty".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
