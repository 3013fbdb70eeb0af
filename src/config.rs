//! Configuration management for the travel agent tools
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelAgentError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable consulted when no search API key is configured
pub const SERPAPI_KEY_ENV: &str = "SERPAPI_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelAgentConfig {
    /// Flight and hotel search API configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Encyclopedia (destination description) configuration
    #[serde(default)]
    pub encyclopedia: EncyclopediaConfig,
    /// Booking deep link configuration
    #[serde(default)]
    pub booking: BookingConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search API (SerpApi) configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// SerpApi key; falls back to `SERPAPI_API_KEY`
    pub api_key: Option<String>,
    /// Search endpoint
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Interface language sent as `hl`
    #[serde(default = "default_language")]
    pub language: String,
    /// Country sent as `gl`
    #[serde(default = "default_region")]
    pub region: String,
    /// Price currency
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Encyclopedia API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncyclopediaConfig {
    /// MediaWiki action API endpoint
    #[serde(default = "default_encyclopedia_api_url")]
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Deep link prefix; the flight code is appended as `/code/{flight_code}`
    #[serde(default = "default_booking_base_url")]
    pub base_url: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_search_base_url() -> String {
    "https://serpapi.com/search.json".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_language() -> String {
    "en".to_string()
}

fn default_region() -> String {
    "us".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_encyclopedia_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_booking_base_url() -> String {
    "https://www.airpaz.com/en/flight".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            timeout_seconds: default_timeout(),
            language: default_language(),
            region: default_region(),
            currency: default_currency(),
        }
    }
}

impl Default for EncyclopediaConfig {
    fn default() -> Self {
        Self {
            api_url: default_encyclopedia_api_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            base_url: default_booking_base_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TravelAgentConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. TRAVELAGENT_SEARCH__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("TRAVELAGENT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelAgentConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.search.api_key.is_none() {
            config.search.api_key = env::var(SERPAPI_KEY_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travel-agent").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.search.base_url.is_empty() {
            self.search.base_url = default_search_base_url();
        }
        if self.search.timeout_seconds == 0 {
            self.search.timeout_seconds = default_timeout();
        }
        if self.search.language.is_empty() {
            self.search.language = default_language();
        }
        if self.search.region.is_empty() {
            self.search.region = default_region();
        }
        if self.search.currency.is_empty() {
            self.search.currency = default_currency();
        }
        if self.encyclopedia.api_url.is_empty() {
            self.encyclopedia.api_url = default_encyclopedia_api_url();
        }
        if self.encyclopedia.timeout_seconds == 0 {
            self.encyclopedia.timeout_seconds = default_timeout();
        }
        if self.booking.base_url.is_empty() {
            self.booking.base_url = default_booking_base_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials.
    ///
    /// A missing key is allowed: the description and booking tools work
    /// without one, and the search tools report the missing key per call.
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.search.api_key {
            if api_key.is_empty() {
                return Err(TravelAgentError::config(
                    "Search API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(TravelAgentError::config(
                    "Search API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 100 {
                return Err(TravelAgentError::config(
                    "Search API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.search.timeout_seconds > 300 {
            return Err(TravelAgentError::config("Search API timeout cannot exceed 300 seconds").into());
        }

        if self.encyclopedia.timeout_seconds > 300 {
            return Err(
                TravelAgentError::config("Encyclopedia API timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelAgentError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelAgentError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Search API base URL", &self.search.base_url),
            ("Encyclopedia API URL", &self.encyclopedia.api_url),
            ("Booking base URL", &self.booking.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelAgentError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
