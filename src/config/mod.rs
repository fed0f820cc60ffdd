//! Configuration Module - TOML-based Portal Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides (a `.env` file is honoured).
//! Store credentials normally come from the environment; everything
//! else has a sensible default so an empty file is a valid config.

pub mod loader;

use serde::Deserialize;

/// Top-level portal configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the gateway is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Portal identity and logging.
  #[serde(default)]
  pub portal: PortalConfig,
  /// Store binding (remote credentials or fallback location).
  #[serde(default)]
  pub store: StoreConfig,
  /// Health and metrics endpoints.
  #[serde(default)]
  pub server: ServerConfig,
}

/// Portal identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
  /// Human-readable portal name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Emit JSON log lines instead of human-readable ones.
  #[serde(default = "default_true")]
  pub log_json: bool,
}

impl Default for PortalConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      log_json: true,
    }
  }
}

/// Store binding.
///
/// Remote mode needs both `url` and `key` non-blank; otherwise the
/// local fallback is used, file-backed when `data_dir` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Remote project base URL (env: PORTAL_STORE_URL).
  #[serde(default)]
  pub url: Option<String>,
  /// Remote access key (env: PORTAL_STORE_KEY).
  #[serde(default)]
  pub key: Option<String>,
  /// Directory for fallback bucket files. Unset = memory only.
  #[serde(default)]
  pub data_dir: Option<String>,
  /// Remote request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum concurrent remote requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      url: None,
      key: None,
      data_dir: None,
      timeout_seconds: default_timeout(),
      max_concurrent: default_max_concurrent(),
    }
  }
}

/// Health and metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub metrics_enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub metrics_bind_address: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      health_port: default_health_port(),
      metrics_enabled: true,
      metrics_bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "Arena Portal".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_timeout() -> u64 {
  30
}

fn default_max_concurrent() -> usize {
  10
}

fn default_health_port() -> u16 {
  8080
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
