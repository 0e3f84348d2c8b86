//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/assent/config.toml` (system)
//! 3. Merge `~/.assent/config.toml` (user)
//! 4. Merge the file passed with `--config` (explicit)
//! 5. Apply env var fallbacks for fields no file set
//! 6. Resolve `${VAR}` references and deserialize → `Config`
//! 7. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars, resolve_env_references};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_layer};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// System-wide config location.
const SYSTEM_CONFIG_PATH: &str = "/etc/assent/config.toml";

/// A loaded configuration together with where each value came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The validated configuration.
    pub config: Config,
    /// Which layer set each dotted field path.
    pub field_sources: FieldSources,
    /// Files that were found and merged, lowest precedence first.
    pub loaded_files: Vec<String>,
}

/// Inputs to [`load_with`]. [`load`] fills these from the real environment.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// System config file, if any.
    pub system_path: Option<PathBuf>,
    /// Directory holding the user's `config.toml` (normally `~/.assent`).
    pub user_dir: Option<PathBuf>,
    /// File named on the command line. Must exist.
    pub explicit_path: Option<PathBuf>,
    /// Environment variables used for fallbacks and `${VAR}` references.
    pub env_vars: HashMap<String, String>,
}

/// Load the configuration with layered file precedence.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, the explicit
/// file is missing, or the merged configuration fails validation.
pub fn load(explicit_path: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let user_dir = home_directory()?.join(".assent");
    load_with(&LoadOptions {
        system_path: Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
        user_dir: Some(user_dir),
        explicit_path: explicit_path.map(Path::to_path_buf),
        env_vars: collect_env_vars(),
    })
}

/// Load the configuration from explicit inputs.
///
/// # Errors
///
/// See [`load`].
pub fn load_with(options: &LoadOptions) -> ConfigResult<ResolvedConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_layer(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    // 2-3. Optional system and user files.
    let optional = [
        (options.system_path.clone(), ConfigLayer::System),
        (
            options.user_dir.as_ref().map(|d| d.join("config.toml")),
            ConfigLayer::User,
        ),
    ];
    for (path, layer) in optional {
        let Some(path) = path else { continue };
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), layer = %layer, "loaded config file");
        }
    }

    // 4. Explicit file: missing is an error.
    if let Some(path) = &options.explicit_path {
        let overlay = read_toml(path)?;
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::Explicit,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded config file from --config");
    }

    // 5. Env var fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, &options.env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 6. ${VAR} references, then deserialize.
    resolve_env_references(&mut merged, &options.env_vars);
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 7. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering, no env).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = read_toml(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match read_toml(path) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

/// Read and parse a TOML file, rejecting oversized files.
///
/// Uses a single read so there is no window between a size check and the
/// read.
fn read_toml(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
