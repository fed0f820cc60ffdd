//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O, metrics export).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `remote`: REST client for the hosted document store
//! - `persistence`: local JSON bucket fallback store
//! - `metrics`: Prometheus metrics export and health checks

pub mod metrics;
pub mod persistence;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::StoreConfig;
use crate::ports::store::{DocumentStore, StoreMode};

use persistence::LocalStore;
use remote::{RemoteCredentials, RemoteStore, RestClient, RestClientConfig};

/// Pick and build the store backend for this process.
///
/// Remote when both URL and key are non-blank, fallback otherwise.
/// Called once at startup; the choice is never revisited.
pub async fn connect_store(config: &StoreConfig) -> Result<(Arc<dyn DocumentStore>, StoreMode)> {
    if let Some(credentials) =
        RemoteCredentials::from_parts(config.url.as_deref(), config.key.as_deref())
    {
        info!(url = %credentials.base_url(), "Using remote document store");
        let client = RestClient::new(
            credentials,
            RestClientConfig {
                timeout: Duration::from_secs(config.timeout_seconds),
                max_concurrent: config.max_concurrent,
            },
        )
        .context("Failed to create remote store client")?;
        let store: Arc<dyn DocumentStore> = Arc::new(RemoteStore::new(Arc::new(client)));
        return Ok((store, StoreMode::Remote));
    }

    let store = match config.data_dir.as_deref() {
        Some(dir) => LocalStore::open(dir)
            .await
            .context("Failed to open local fallback store")?,
        None => LocalStore::in_memory(),
    };
    info!(
        persistent = store.is_persistent(),
        "Remote store not configured, using local fallback"
    );
    Ok((Arc::new(store), StoreMode::Fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_selects_fallback() {
        let config = StoreConfig {
            url: Some("https://proj.example.co".to_string()),
            key: None,
            ..StoreConfig::default()
        };
        let (_, mode) = connect_store(&config).await.unwrap();
        assert_eq!(mode, StoreMode::Fallback);
    }

    #[tokio::test]
    async fn test_url_and_key_select_remote() {
        let config = StoreConfig {
            url: Some("https://proj.example.co".to_string()),
            key: Some("anon-key".to_string()),
            ..StoreConfig::default()
        };
        let (_, mode) = connect_store(&config).await.unwrap();
        assert_eq!(mode, StoreMode::Remote);
    }
}
