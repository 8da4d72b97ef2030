//! # Configuration System
//!
//! Hierarchical TOML configuration.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.purge/config.toml` (global user preferences)
//! 3. **Project config** - `./.purge/config.toml` (project-specific overrides)
//! 4. **Environment** - `CLOUDFLARE_ACCOUNT_ID`, `PURGE_API_BASE_URL`
//! 5. **CLI arguments** - Command-line flags (highest priority)
//!
//! The API token is never read from config files, only from
//! `CLOUDFLARE_API_TOKEN`.
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use purge_core::config::PurgeConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PurgeConfig::load_hierarchy()?;
//!     let concurrency = config.scan.concurrency();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

// Public API exports
pub use loading::{ACCOUNT_ID_ENV, API_BASE_URL_ENV};
pub use types::{AccountConfig, ApiConfig, PurgeConfig, ScanConfig};
pub use validation::validate_config;

impl PurgeConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }
}
