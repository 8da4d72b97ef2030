use crate::config::types::PurgeConfig;
use crate::errors::ConfigError;

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` for a zero concurrency or
/// timeout, an empty account id, or a base URL that is not http(s).
pub fn validate_config(config: &PurgeConfig) -> Result<(), ConfigError> {
    if config.scan.concurrency == Some(0) {
        return Err(invalid("scan.concurrency must be greater than 0"));
    }

    if config.api.timeout_secs == Some(0) {
        return Err(invalid("api.timeout_secs must be greater than 0"));
    }

    if let Some(id) = &config.account.id
        && id.trim().is_empty()
    {
        return Err(invalid("account.id must not be empty"));
    }

    let base_url = config.api.base_url();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "api.base_url '{}' must start with http:// or https://",
                base_url
            ),
        });
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.to_string(),
    }
}
