#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for the Assent approval broker.
//!
//! # Usage
//!
//! ```rust,no_run
//! use assent_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("listening on {}", resolved.config.server.listen_addr());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit** file passed with `--config`
//! 2. **User** (`~/.assent/config.toml`)
//! 3. **System** (`/etc/assent/config.toml`)
//! 4. **Environment variables** (`ASSENT_*`, plus the legacy `PORT`,
//!    `REQUEST_PATH`, `API_TOKEN`, `VERIFICATION_TOKEN`, `USER_NAME`,
//!    `ICON_EMOJI`): fallback only
//! 5. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! This crate has no dependencies on other assent crates. Conversion into
//! engine and Slack types happens in the daemon.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with precedence.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{LoadOptions, ResolvedConfig};
pub use merge::ConfigLayer;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit_path: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit_path)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
