//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Handles loading `config.toml`, layering environment overrides on
//! top, validating all parameters, and providing clear error messages
//! for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Env var overriding `store.url`.
pub const ENV_STORE_URL: &str = "PORTAL_STORE_URL";
/// Env var overriding `store.key`.
pub const ENV_STORE_KEY: &str = "PORTAL_STORE_KEY";
/// Env var overriding `store.data_dir`.
pub const ENV_DATA_DIR: &str = "PORTAL_DATA_DIR";
/// Env var overriding `portal.log_level`.
pub const ENV_LOG_LEVEL: &str = "PORTAL_LOG_LEVEL";

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content, |key| std::env::var(key).ok())?;

  info!(
    path = %path.display(),
    remote = config.store.url.is_some(),
    data_dir = ?config.store.data_dir,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Like `load_config`, but a missing file means "all defaults".
///
/// Env overrides still apply, so a bare environment is enough to run.
pub fn load_config_or_default(path: &str) -> Result<AppConfig> {
  if Path::new(path).exists() {
    return load_config(path);
  }

  let mut config = AppConfig::default();
  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;
  info!(path, "No config file found, using defaults");
  Ok(config)
}

/// Parse TOML text, apply overrides from `env`, then validate.
pub fn parse_config<F>(content: &str, env: F) -> Result<AppConfig>
where
  F: Fn(&str) -> Option<String>,
{
  let mut config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  apply_env_overrides(&mut config, env);
  validate_config(&config)?;
  Ok(config)
}

/// Layer environment values over file values. Blank env values are
/// ignored so an empty `PORTAL_STORE_URL=` cannot clear a file setting.
pub fn apply_env_overrides<F>(config: &mut AppConfig, env: F)
where
  F: Fn(&str) -> Option<String>,
{
  let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

  if let Some(url) = lookup(ENV_STORE_URL) {
    config.store.url = Some(url);
  }
  if let Some(key) = lookup(ENV_STORE_KEY) {
    config.store.key = Some(key);
  }
  if let Some(dir) = lookup(ENV_DATA_DIR) {
    config.store.data_dir = Some(dir);
  }
  if let Some(level) = lookup(ENV_LOG_LEVEL) {
    config.portal.log_level = level;
  }
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Known log level
/// - Positive timeouts and concurrency
/// - A remote URL that looks like http(s)
/// - Non-empty metrics bind address when metrics are on
fn validate_config(config: &AppConfig) -> Result<()> {
  const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

  anyhow::ensure!(
    LEVELS.contains(&config.portal.log_level.to_lowercase().as_str()),
    "log_level must be one of {:?}, got {}",
    LEVELS,
    config.portal.log_level
  );

  anyhow::ensure!(
    config.store.timeout_seconds > 0,
    "store.timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.store.max_concurrent > 0,
    "store.max_concurrent must be positive"
  );

  if let Some(url) = config.store.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
    anyhow::ensure!(
      url.starts_with("http://") || url.starts_with("https://"),
      "store.url must be an http(s) URL, got {url}"
    );
  }

  if config.server.metrics_enabled {
    anyhow::ensure!(
      !config.server.metrics_bind_address.is_empty(),
      "metrics_bind_address must not be empty when metrics are enabled"
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn no_env(_: &str) -> Option<String> {
    None
  }

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_file_gives_defaults() {
    let config = parse_config("", no_env).unwrap();
    assert_eq!(config.portal.log_level, "info");
    assert_eq!(config.store.timeout_seconds, 30);
    assert!(config.store.url.is_none());
    assert_eq!(config.server.health_port, 8080);
  }

  #[test]
  fn test_env_overrides_file_credentials() {
    let toml = r#"
      [store]
      url = "https://file.example.co"
      key = "file-key"
    "#;
    let config = parse_config(toml, |key| match key {
      ENV_STORE_KEY => Some("env-key".to_string()),
      ENV_STORE_URL => Some("   ".to_string()),
      _ => None,
    })
    .unwrap();

    assert_eq!(config.store.url.as_deref(), Some("https://file.example.co"));
    assert_eq!(config.store.key.as_deref(), Some("env-key"));
  }

  #[test]
  fn test_rejects_bad_log_level_and_url() {
    assert!(parse_config("[portal]\nlog_level = \"loud\"", no_env).is_err());
    assert!(parse_config("[store]\nurl = \"ftp://x\"", no_env).is_err());
    assert!(parse_config("[store]\ntimeout_seconds = 0", no_env).is_err());
  }
}
