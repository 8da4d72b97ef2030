//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.purge/config.toml`
//! 3. **Project config** - `./.purge/config.toml`
//! 4. **Environment** - `CLOUDFLARE_ACCOUNT_ID`, `PURGE_API_BASE_URL`
//! 5. **CLI arguments** - applied by the caller (highest priority)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::types::{AccountConfig, ApiConfig, PurgeConfig, ScanConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

pub const ACCOUNT_ID_ENV: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const API_BASE_URL_ENV: &str = "PURGE_API_BASE_URL";

const CONFIG_DIR: &str = ".purge";
const CONFIG_FILE: &str = "config.toml";

/// Load configuration from the config files and the process environment.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed, or
/// if validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<PurgeConfig, ConfigError> {
    let user_path = dirs::home_dir().map(|home| config_path_in(&home));
    let project_path = std::env::current_dir()?;
    let project_path = config_path_in(&project_path);

    load_from(
        user_path.as_deref(),
        Some(project_path.as_path()),
        |name| std::env::var(name).ok(),
    )
}

/// Load from explicit file locations with an injectable environment.
pub fn load_from(
    user_path: Option<&Path>,
    project_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PurgeConfig, ConfigError> {
    let mut config = PurgeConfig::default();

    for path in [user_path, project_path].into_iter().flatten() {
        if let Some(file_config) = load_config_file(path)? {
            debug!(event = "core.config.file_loaded", path = %path.display());
            config = merge_configs(config, file_config);
        }
    }

    config = apply_env_overrides(config, env);

    validate_config(&config)?;

    Ok(config)
}

fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Load one config file. `Ok(None)` when the file does not exist.
pub fn load_config_file(path: &Path) -> Result<Option<PurgeConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::IoError { source: e }),
    };

    let config = toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Merge two configurations, with override_config taking precedence.
///
/// Override values replace base values only if present.
pub fn merge_configs(base: PurgeConfig, override_config: PurgeConfig) -> PurgeConfig {
    PurgeConfig {
        account: AccountConfig {
            id: override_config.account.id.or(base.account.id),
        },
        api: ApiConfig {
            base_url: override_config.api.base_url.or(base.api.base_url),
            timeout_secs: override_config.api.timeout_secs.or(base.api.timeout_secs),
        },
        scan: ScanConfig {
            concurrency: override_config.scan.concurrency.or(base.scan.concurrency),
            skip_dependency_check: override_config
                .scan
                .skip_dependency_check
                .or(base.scan.skip_dependency_check),
        },
    }
}

/// Apply environment variables on top of file configuration.
///
/// Unset or blank variables leave the config untouched.
pub fn apply_env_overrides(
    mut config: PurgeConfig,
    env: impl Fn(&str) -> Option<String>,
) -> PurgeConfig {
    let read = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(account_id) = read(ACCOUNT_ID_ENV) {
        config.account.id = Some(account_id.trim().to_string());
    }
    if let Some(base_url) = read(API_BASE_URL_ENV) {
        config.api.base_url = Some(base_url.trim().to_string());
    }
    config
}
