use crate::constants::{LOG_FILE_NAME, cache_ttl, env_vars};
use crate::data_fetcher::models::Sport;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub mod paths;
pub mod user_prompts;
pub mod validation;

use paths::{get_cache_dir_path, get_config_path, get_log_dir_path};
use user_prompts::prompt_for_api_key;
use validation::{validate_cache_settings, validate_config};

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Key sent in the `x-apisports-key` header
    pub api_key: String,
    /// Overrides every sport's default API base URL. Mostly useful for
    /// proxies and tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Lifetime of cached responses in seconds. When unset, the TTL stored
    /// with the cache is used (5 minutes for a new cache).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_seconds: Option<u64>,
    /// Directory for persisted caches. Defaults to the platform cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
}

fn default_http_timeout() -> u64 {
    crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            api_base_url: None,
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            cache_ttl_seconds: None,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// If no config file exists, prompts the user for an API key and creates one.
    /// Environment variables can override config file values.
    ///
    /// # Environment Variables
    /// - `SPORTS_API_KEY` - Override API key
    /// - `SPORTS_API_BASE_URL` - Override API base URL for every sport
    /// - `SPORTS_API_LOG_FILE` - Override log file path
    /// - `SPORTS_API_HTTP_TIMEOUT` - Override HTTP timeout in seconds (default: 30)
    /// - `SPORTS_API_CACHE_TTL` - Override cache TTL in seconds (default: 300)
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else if let Ok(api_key) = std::env::var(env_vars::API_KEY) {
            Config {
                api_key,
                ..Config::default()
            }
        } else {
            let config = Config {
                api_key: prompt_for_api_key().await?,
                ..Config::default()
            };
            config.save().await?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads only what the cache commands need: the config file when present,
    /// otherwise defaults, plus environment overrides. Never prompts and does
    /// not require an API key.
    pub async fn load_cache_settings() -> Result<Self, AppError> {
        Self::load_cache_settings_from(&get_config_path()).await
    }

    async fn load_cache_settings_from(path: &str) -> Result<Self, AppError> {
        let mut config = if Path::new(path).exists() {
            Self::load_from_path(path).await?
        } else {
            debug!("No config file at {path}, using cache defaults");
            Config::default()
        };
        config.apply_env_overrides();
        validate_cache_settings(&config)?;
        Ok(config)
    }

    /// Replaces settings with values from the environment where present.
    /// Unparseable numeric values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var(env_vars::API_KEY) {
            self.api_key = api_key;
        }

        if let Ok(base_url) = std::env::var(env_vars::API_BASE_URL) {
            self.api_base_url = Some(base_url);
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }

        if let Some(ttl) = std::env::var(env_vars::CACHE_TTL)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.cache_ttl_seconds = Some(ttl);
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Base URL for `sport`: the configured override, otherwise the sport's
    /// own API host. Never ends with a slash.
    pub fn base_url_for(&self, sport: Sport) -> String {
        match &self.api_base_url {
            Some(base_url) => base_url.trim_end_matches('/').to_string(),
            None => sport.base_url().to_string(),
        }
    }

    /// Explicitly configured cache TTL, if any
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_seconds.map(Duration::from_secs)
    }

    /// Directory holding persisted cache files
    pub fn cache_dir_path(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(get_cache_dir_path()),
        }
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    ///
    /// # Notes
    /// - Shows config file location and current settings
    /// - Only the last four characters of the API key are shown
    /// - Handles case when no config file exists
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();

        if Path::new(&config_path).exists() {
            let config = Config::load().await?;
            println!("\nCurrent Configuration");
            println!("────────────────────────────────────");
            println!("Config Location:");
            println!("{config_path}");
            println!("────────────────────────────────────");
            println!("API Key:");
            println!("{}", config.masked_api_key());
            println!("────────────────────────────────────");
            println!("API Base URL:");
            match &config.api_base_url {
                Some(base_url) => println!("{base_url}"),
                None => println!("(Per-sport default)"),
            }
            println!("────────────────────────────────────");
            println!("HTTP Timeout:");
            println!("{} seconds", config.http_timeout_seconds);
            println!("────────────────────────────────────");
            println!("Cache TTL:");
            match config.cache_ttl_seconds {
                Some(ttl) => println!("{ttl} seconds"),
                None => println!(
                    "(Stored with the cache, {} seconds for a new cache)",
                    cache_ttl::DEFAULT_SECONDS
                ),
            }
            println!("────────────────────────────────────");
            println!("Cache Location:");
            println!("{}", config.cache_dir_path().display());
            println!("────────────────────────────────────");
            println!("Log File Location:");
            if let Some(custom_path) = &config.log_file_path {
                println!("{custom_path}");
            } else {
                println!("{log_dir}/{LOG_FILE_NAME}");
                println!("(Default location)");
            }
        } else {
            println!("\nNo configuration file found at:");
            println!("{config_path}");
        }

        Ok(())
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{visible}", "*".repeat(chars.len() - 4))
    }

    /// Saves configuration to a custom file path, creating the parent
    /// directory if needed. A trailing slash on the base URL is dropped.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }

        let content = toml::to_string_pretty(&Config {
            api_base_url: self
                .api_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            ..self.clone()
        })?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        debug!("Saved configuration to {path}");
        Ok(())
    }

    /// Loads configuration from a custom file path without applying
    /// environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
