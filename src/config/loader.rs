//! Configuration file loading.

use crate::config::schema::CacheConfig;
use crate::error::{CacheError, Result};
use std::fs;
use std::path::Path;

/// Load a single config file and parse it into [`CacheConfig`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
/// Returns `ConfigValidationError` if a value is out of range.
pub fn load_config_file(path: &Path) -> Result<CacheConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CacheError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CacheError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into [`CacheConfig`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<CacheConfig> {
    let config: CacheConfig =
        serde_yaml::from_str(content).map_err(|e| CacheError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

    validate(&config)?;
    Ok(config)
}

/// Check values that the schema alone cannot rule out.
pub fn validate(config: &CacheConfig) -> Result<()> {
    if config.shard_depth() == 0 {
        return Err(CacheError::ConfigValidationError {
            message: "shard-depth must be a positive integer".to_string(),
        });
    }

    // Surface bad condition kinds at load time rather than on first lookup.
    config.default_conditions().parse()?;

    Ok(())
}
