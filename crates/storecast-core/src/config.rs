//! Configuration for the STORECAST dashboard.
//!
//! Configuration resolves in layers: built-in defaults, then
//! `~/.storecast/config.yaml` (if present), then the `STORECAST_API_URL`
//! environment variable, then CLI flags (applied by the binary).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorecastError};

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "STORECAST_API_URL";

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the forecasting service (e.g. "http://127.0.0.1:5000")
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// With an explicit `path`, the file must exist and parse. With `None`,
    /// the default path is used if it exists; otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(StorecastError::config_not_found(p));
                }
                p.to_path_buf()
            }
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let raw = std::fs::read_to_string(&path).map_err(|e| StorecastError::ConfigNotFound {
            path: path.clone(),
            source: Some(e),
        })?;

        serde_yaml::from_str(&raw)
            .map_err(|e| StorecastError::config_invalid(&path, e.to_string()))
    }

    /// Apply environment variable overrides.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.is_empty()
        {
            self.api_base_url = url;
        }
        self
    }

    /// Override the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Get the default configuration file path.
///
/// Returns `~/.storecast/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".storecast").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url: http://forecast.internal:8080").unwrap();
        writeln!(file, "timeout_secs: 10").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_base_url, "http://forecast.internal:8080");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url: http://forecast.internal:8080").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_load_missing_explicit_file_errors() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/config.yaml"))).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_invalid_yaml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_base_url: [not a string").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, StorecastError::ConfigInvalid { .. }));
    }

    #[test]
    #[serial]
    fn test_apply_env_override() {
        // SAFETY: test context, serialized with other env-mutating tests
        unsafe { std::env::set_var(API_URL_ENV, "http://override:9000") };
        let config = AppConfig::default().apply_env();
        assert_eq!(config.api_base_url, "http://override:9000");
        unsafe { std::env::remove_var(API_URL_ENV) };
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::default()
            .with_api_base_url("http://cli:1234")
            .with_timeout_secs(5);
        assert_eq!(config.api_base_url, "http://cli:1234");
        assert_eq!(config.timeout_secs, 5);
    }
}
