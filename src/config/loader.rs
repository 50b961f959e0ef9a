//! Locating, reading and merging configuration files.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use super::{Config, ConfigError};

/// Path used when the caller does not name a configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

/// Resolves a configuration file path.
///
/// Tries, in order:
/// 1. `path` as given (absolute or relative to the working directory)
/// 2. `configs/config.yaml` under the working directory
/// 3. `~/.annotator/config.yaml`
///
/// # Errors
///
/// Returns `ConfigError::NotFound` listing every location tried.
pub fn resolve_config_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().ok();
    let home = dirs::home_dir();
    let candidates = candidate_paths(path, cwd.as_deref(), home.as_deref());

    for candidate in &candidates {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "resolved config path");
            return Ok(std::path::absolute(candidate).unwrap_or_else(|_| candidate.clone()));
        }
    }

    Err(ConfigError::NotFound { tried: candidates })
}

/// Ordered, de-duplicated list of locations checked by `resolve_config_path`.
pub fn candidate_paths(path: &Path, cwd: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![path.to_path_buf()];
    if let Some(cwd) = cwd {
        candidates.push(cwd.join(DEFAULT_CONFIG_PATH));
    }
    if let Some(home) = home {
        candidates.push(home.join(".annotator").join("config.yaml"));
    }

    let mut unique: Vec<PathBuf> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

/// Loads and merges one or more configuration files.
///
/// The first path goes through `resolve_config_path`; any further paths are
/// overlays and must exist as given. Documents are deep-merged in order.
///
/// # Errors
///
/// Returns `ConfigError` if a file cannot be found, read or parsed, or if the
/// merged document fails validation.
pub fn load_config(paths: &[PathBuf]) -> Result<Config, ConfigError> {
    let Some((first, overlays)) = paths.split_first() else {
        return load_config(&[PathBuf::from(DEFAULT_CONFIG_PATH)]);
    };

    let mut merged = read_yaml(&resolve_config_path(first)?)?;
    for overlay in overlays {
        merge_values(&mut merged, read_yaml(overlay)?);
    }

    Config::from_value(merged)
}

fn read_yaml(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Deep-merges `overlay` into `base`.
///
/// Mappings merge key by key; any other overlay value replaces the base value.
/// A null overlay (an empty file) leaves `base` untouched.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
