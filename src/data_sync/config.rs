use crate::constants::{
    CIRCUIT_INFO_BASE_URL, DEFAULT_DATABASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PAGE_SIZE,
    DEFAULT_REQUEST_DELAY_MS, ERGAST_BASE_URL, OPENF1_BASE_URL, REST_COUNTRIES_URL,
};
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration for the synchronizers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Connection URL of the tracker database
    pub database_url: String,
    /// Base URL of the historical results API
    pub ergast_base_url: String,
    /// Base URL of the country reference API
    pub rest_countries_url: String,
    /// Base URL of the session telemetry API
    pub openf1_base_url: String,
    /// Base URL of the circuit layout API
    pub circuit_info_base_url: String,
    /// Records requested per results API page
    pub page_size: u32,
    /// Fixed pause between two requests to the results API
    pub request_delay_ms: u64,
    /// Timeout for HTTP requests in seconds
    pub http_timeout_secs: u64,
    /// Optional on-disk cache for telemetry responses
    pub telemetry_cache_dir: Option<PathBuf>,
    /// Optional TOML file with the team crosswalk
    pub team_crosswalk_file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            ergast_base_url: ERGAST_BASE_URL.to_string(),
            rest_countries_url: REST_COUNTRIES_URL.to_string(),
            openf1_base_url: OPENF1_BASE_URL.to_string(),
            circuit_info_base_url: CIRCUIT_INFO_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            telemetry_cache_dir: None,
            team_crosswalk_file: None,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(database_url) = lookup("DATABASE_URL") {
            config.database_url = database_url;
        }

        if let Some(url) = lookup("ERGAST_BASE_URL") {
            config.ergast_base_url = validated_url("ERGAST_BASE_URL", url)?;
        }

        if let Some(url) = lookup("REST_COUNTRIES_URL") {
            config.rest_countries_url = validated_url("REST_COUNTRIES_URL", url)?;
        }

        if let Some(url) = lookup("OPENF1_BASE_URL") {
            config.openf1_base_url = validated_url("OPENF1_BASE_URL", url)?;
        }

        if let Some(url) = lookup("CIRCUIT_INFO_BASE_URL") {
            config.circuit_info_base_url = validated_url("CIRCUIT_INFO_BASE_URL", url)?;
        }

        if let Some(page_size) = lookup("PAGE_SIZE") {
            config.page_size = page_size
                .parse()
                .map_err(|e| SyncError::Config(format!("Invalid PAGE_SIZE: {}", e)))?;
            if config.page_size == 0 {
                return Err(SyncError::Config("PAGE_SIZE must be positive".to_string()));
            }
        }

        if let Some(delay) = lookup("REQUEST_DELAY_MS") {
            config.request_delay_ms = delay
                .parse()
                .map_err(|e| SyncError::Config(format!("Invalid REQUEST_DELAY_MS: {}", e)))?;
        }

        if let Some(timeout) = lookup("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = timeout
                .parse()
                .map_err(|e| SyncError::Config(format!("Invalid HTTP_TIMEOUT_SECS: {}", e)))?;
        }

        config.telemetry_cache_dir = lookup("TELEMETRY_CACHE_DIR").filter(|s| !s.is_empty()).map(PathBuf::from);
        config.team_crosswalk_file = lookup("TEAM_CROSSWALK_FILE").filter(|s| !s.is_empty()).map(PathBuf::from);

        Ok(config)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn validated_url(key: &str, value: String) -> Result<String> {
    Url::parse(&value).map_err(|e| SyncError::Config(format!("Invalid {}: {}", key, e)))?;
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.ergast_base_url, "https://api.jolpi.ca/ergast/f1");
        assert_eq!(config.page_size, 30);
        assert_eq!(config.request_delay(), Duration::from_millis(500));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(config.telemetry_cache_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = SyncConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ERGAST_BASE_URL", "http://localhost:8000/ergast/f1/"),
            ("PAGE_SIZE", "100"),
            ("REQUEST_DELAY_MS", "0"),
            ("TELEMETRY_CACHE_DIR", "/tmp/telemetry"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.ergast_base_url, "http://localhost:8000/ergast/f1");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.request_delay(), Duration::ZERO);
        assert_eq!(config.telemetry_cache_dir, Some(PathBuf::from("/tmp/telemetry")));
    }

    #[test]
    fn test_invalid_values() {
        assert!(SyncConfig::from_lookup(lookup_from(&[("ERGAST_BASE_URL", "not a url")])).is_err());
        assert!(SyncConfig::from_lookup(lookup_from(&[("PAGE_SIZE", "zero")])).is_err());
        assert!(SyncConfig::from_lookup(lookup_from(&[("PAGE_SIZE", "0")])).is_err());
    }
}
