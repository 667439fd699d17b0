use crate::error::AppError;
use std::path::Path;

use super::Config;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API key cannot be empty
/// - A base URL override must start with http:// or https://
/// - HTTP timeout must be positive
/// - Cache settings pass [`validate_cache_settings`]
/// - If log file path is provided, it cannot be empty and its parent
///   directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.api_key.trim().is_empty() {
        return Err(AppError::config_error("API key cannot be empty"));
    }

    if let Some(base_url) = &config.api_base_url
        && !base_url.starts_with("http://")
        && !base_url.starts_with("https://")
    {
        return Err(AppError::config_error(format!(
            "API base URL must start with http:// or https:// (got '{base_url}')"
        )));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "HTTP timeout must be at least one second",
        ));
    }

    validate_cache_settings(config)?;

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// Checks the settings used by cache-only commands, which need no API key.
pub fn validate_cache_settings(config: &Config) -> Result<(), AppError> {
    if config.cache_ttl_seconds == Some(0) {
        return Err(AppError::config_error("Cache TTL must be at least one second"));
    }

    if config.cache_dir.as_deref().is_some_and(|dir| dir.trim().is_empty()) {
        return Err(AppError::config_error("Cache directory cannot be empty"));
    }

    Ok(())
}
