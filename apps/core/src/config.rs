//! Engine configuration.
//!
//! Read once at start-up from environment variables (after an optional `.env`
//! file). Bad values are replaced by defaults with a warning; configuration
//! never stops the engine from starting.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use validator::Validate;

use crate::analysis::themes::ThemeMatchMode;

pub const ENV_CATALOG_PATH: &str = "HOMEBRIDGE_CATALOG_PATH";
pub const ENV_PROVIDER_URL: &str = "HOMEBRIDGE_PROVIDER_URL";
pub const ENV_PROVIDER_TOKEN: &str = "HOMEBRIDGE_PROVIDER_TOKEN";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "HOMEBRIDGE_PROVIDER_TIMEOUT_MS";
pub const ENV_LEMMATIZE: &str = "HOMEBRIDGE_LEMMATIZE";
pub const ENV_THEME_MODE: &str = "HOMEBRIDGE_THEME_MODE";
pub const ENV_LOG_LEVEL: &str = "HOMEBRIDGE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "HOMEBRIDGE_LOG_FORMAT";

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Connection settings for the external analysis provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProviderConfig {
    /// Base URL of a llama.cpp-compatible completion server.
    #[validate(url)]
    pub url: String,
    /// Optional bearer token.
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    /// Timeout for one provider call. Between 100ms and 60s.
    #[validate(range(min = 100, max = 60000))]
    pub timeout_ms: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Lexicon/strategy catalog file. `None` uses the compiled-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// External provider. `None` means local analysis only.
    pub provider: Option<ProviderConfig>,
    pub lemmatize: bool,
    pub theme_mode: ThemeMatchMode,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            provider: None,
            lemmatize: true,
            theme_mode: ThemeMatchMode::Frequency,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl EngineConfig {
    /// Load `.env` (if present), then read the environment.
    pub fn load() -> Self {
        // A missing .env file is the normal case
        let _ = dotenv::dotenv();
        Self::from_env()
    }

    /// Build the configuration from the current environment only.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let catalog_path = non_empty_var(ENV_CATALOG_PATH).map(PathBuf::from);

        let lemmatize = match non_empty_var(ENV_LEMMATIZE) {
            Some(value) => parse_bool(&value).unwrap_or_else(|| {
                warn!(variable = ENV_LEMMATIZE, value = %value, "Invalid boolean, using default");
                defaults.lemmatize
            }),
            None => defaults.lemmatize,
        };

        let theme_mode = match non_empty_var(ENV_THEME_MODE) {
            Some(value) => ThemeMatchMode::from_name(&value).unwrap_or_else(|| {
                warn!(
                    variable = ENV_THEME_MODE,
                    value = %value,
                    "Unknown theme mode, using default"
                );
                defaults.theme_mode
            }),
            None => defaults.theme_mode,
        };

        let log_format = match non_empty_var(ENV_LOG_FORMAT) {
            Some(value) => LogFormat::from_name(&value).unwrap_or_else(|| {
                warn!(
                    variable = ENV_LOG_FORMAT,
                    value = %value,
                    "Unknown log format, using default"
                );
                defaults.log_format
            }),
            None => defaults.log_format,
        };

        Self {
            catalog_path,
            provider: provider_from_env(),
            lemmatize,
            theme_mode,
            log_level: non_empty_var(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_format,
        }
    }
}

fn provider_from_env() -> Option<ProviderConfig> {
    let url = non_empty_var(ENV_PROVIDER_URL)?;

    let timeout_ms = match non_empty_var(ENV_PROVIDER_TIMEOUT_MS) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(
                variable = ENV_PROVIDER_TIMEOUT_MS,
                value = %value,
                "Invalid number, using default"
            );
            DEFAULT_PROVIDER_TIMEOUT_MS
        }),
        None => DEFAULT_PROVIDER_TIMEOUT_MS,
    };

    let mut provider = ProviderConfig {
        url,
        auth_token: non_empty_var(ENV_PROVIDER_TOKEN),
        timeout_ms,
    };

    if let Err(errors) = provider.validate() {
        let fields = errors.field_errors();
        if fields.contains_key("url") {
            warn!(variable = ENV_PROVIDER_URL, "Invalid provider URL, running without provider");
            return None;
        }
        if fields.contains_key("timeout_ms") {
            warn!(
                variable = ENV_PROVIDER_TIMEOUT_MS,
                value = provider.timeout_ms,
                "Provider timeout out of range, using default"
            );
            provider.timeout_ms = DEFAULT_PROVIDER_TIMEOUT_MS;
        }
    }

    Some(provider)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_log_format_names() {
        assert_eq!(LogFormat::from_name("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_name("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_name("xml"), None);
    }

    #[test]
    fn test_provider_validation() {
        let valid = ProviderConfig {
            url: "http://localhost:8080".to_string(),
            auth_token: None,
            timeout_ms: 500,
        };
        assert!(valid.validate().is_ok());
        assert_eq!(valid.timeout(), Duration::from_millis(500));

        let too_fast = ProviderConfig {
            timeout_ms: 10,
            ..valid.clone()
        };
        assert!(too_fast.validate().is_err());

        let bad_url = ProviderConfig {
            url: "localhost".to_string(),
            ..valid
        };
        assert!(bad_url.validate().is_err());
    }
}
