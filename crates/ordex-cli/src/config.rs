//! Application configuration.
//!
//! Endpoint and retry tuning only; credentials never live here.

use crate::error::{AppError, AppResult};
use ordex_engine::SubmitConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mainnet REST endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Testnet REST endpoint, selected by --testnet.
    #[serde(default = "default_testnet_url")]
    pub testnet_url: String,
    /// Per-request HTTP timeout (ms).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// recvWindow sent with signed requests (ms).
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// Maximum submission attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff base delay (ms); doubles per retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff cap (ms).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Hard ceiling on a whole submission run (ms).
    #[serde(default = "default_overall_deadline_ms")]
    pub overall_deadline_ms: u64,
    /// Resync the clock offset when older than this (ms).
    #[serde(default = "default_clock_max_age_ms")]
    pub clock_max_age_ms: u64,
    /// Directory for the attempt audit log; None disables it.
    #[serde(default = "default_audit_dir")]
    pub audit_dir: Option<String>,
}

fn default_base_url() -> String {
    "https://fapi.binance.com".to_string()
}

fn default_testnet_url() -> String {
    "https://testnet.binancefuture.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_recv_window_ms() -> u64 {
    5_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_overall_deadline_ms() -> u64 {
    60_000
}

fn default_clock_max_age_ms() -> u64 {
    30_000
}

fn default_audit_dir() -> Option<String> {
    Some("./data/audit".to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            testnet_url: default_testnet_url(),
            request_timeout_ms: default_request_timeout_ms(),
            recv_window_ms: default_recv_window_ms(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            overall_deadline_ms: default_overall_deadline_ms(),
            clock_max_age_ms: default_clock_max_age_ms(),
            audit_dir: default_audit_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration: explicit path, then ORDEX_CONFIG, then defaults.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let config_path = path
            .map(str::to_string)
            .or_else(|| std::env::var("ORDEX_CONFIG").ok());

        match config_path {
            Some(path) if Path::new(&path).exists() => Self::from_file(&path),
            Some(path) => Err(AppError::Config(format!("config file not found: {path}"))),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Endpoint for the chosen network.
    pub fn endpoint(&self, testnet: bool) -> &str {
        if testnet {
            &self.testnet_url
        } else {
            &self.base_url
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Retry and timing knobs in engine form.
    pub fn submit_config(&self) -> SubmitConfig {
        SubmitConfig {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            overall_deadline: Duration::from_millis(self.overall_deadline_ms),
            recv_window_ms: self.recv_window_ms,
            clock_max_age: Duration::from_millis(self.clock_max_age_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint(false), "https://fapi.binance.com");
        assert_eq!(config.endpoint(true), "https://testnet.binancefuture.com");
        assert_eq!(config.submit_config().max_attempts, 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str("max_attempts = 5\n").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.recv_window_ms, 5_000);
        assert!(config.audit_dir.is_some());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("max_attempts"));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let err = AppConfig::load(Some("/nonexistent/ordex.toml")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
