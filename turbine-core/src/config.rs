use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::properties::{DynamicProperties, MARATHON_URL_PROPERTY};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub marathon: MarathonConfig,
    pub poll: PollConfig,
    pub logging: LoggingConfig,
}

/// Marathon control-plane connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarathonConfig {
    /// Apps endpoint, e.g. `http://marathon.mesos:8080/v2/apps`
    pub url: Option<String>,
    pub connect_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Default for MarathonConfig {
    fn default() -> Self {
        Self {
            url: None,
            connect_timeout_seconds: 5,
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_seconds: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // TURBINE_MARATHON__URL, TURBINE_POLL__INTERVAL_SECONDS, ...
        builder = builder.add_source(
            Environment::with_prefix("TURBINE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check values that would only fail later at poll time.
    ///
    /// A missing marathon URL is not an error here: discovery reports it on
    /// every call so the URL can be supplied through the property store.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Some(raw) = self.marathon_url() {
            if let Err(e) = url::Url::parse(raw) {
                errors.push(format!("marathon.url '{raw}' is not a valid URL: {e}"));
            }
        }
        if self.marathon.connect_timeout_seconds == 0 {
            errors.push("marathon.connect_timeout_seconds must be greater than 0".to_string());
        }
        if self.marathon.request_timeout_seconds == 0 {
            errors.push("marathon.request_timeout_seconds must be greater than 0".to_string());
        }
        if self.poll.interval_seconds == 0 {
            errors.push("poll.interval_seconds must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Configured marathon URL, ignoring blank values
    #[must_use]
    pub fn marathon_url(&self) -> Option<&str> {
        self.marathon
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Copy the static settings that discovery resolves at call time into the
    /// property store.
    pub fn seed_properties(&self, properties: &DynamicProperties) {
        if let Some(url) = self.marathon_url() {
            properties.set(MARATHON_URL_PROPERTY, url);
        }
    }
}
