// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DocrunError, Result};

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "Docrun.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        DocrunError::ConfigError(format!("reading config file at {:?}: {}", path, e))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration for an invocation.
///
/// - An explicitly requested path must exist.
/// - Otherwise `Docrun.toml` is used when present, and the built-in
///   pipeline defaults when it is not.
///
/// Returns the config together with the project root: the directory that
/// holds the config file, or `.` when running on defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<(ConfigFile, PathBuf)> {
    if let Some(path) = explicit {
        let cfg = load_and_validate(path)?;
        return Ok((cfg, config_root_dir(path)));
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        let cfg = load_and_validate(&default_path)?;
        return Ok((cfg, config_root_dir(&default_path)));
    }

    debug!("no {DEFAULT_CONFIG_FILE} found; using built-in pipeline defaults");
    Ok((ConfigFile::default(), PathBuf::from(".")))
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Figure out the project root for a config file.
///
/// A bare filename like "Docrun.toml" has an empty parent; that means `.`.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
