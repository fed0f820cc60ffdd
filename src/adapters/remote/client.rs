//! REST HTTP Client - Authenticated Table API Client
//!
//! Wraps reqwest with credentials, a concurrency limit and status
//! mapping for the remote store's `/rest/v1/{table}` endpoints.
//! Failures are returned as-is; nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::auth::RemoteCredentials;

/// Path prefix of the table API.
const REST_PREFIX: &str = "/rest/v1";

/// Configuration for the REST client.
#[derive(Debug, Clone)]
pub struct RestClientConfig {
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
}

impl Default for RestClientConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(30),
      max_concurrent: 10,
    }
  }
}

/// Outcome of a request that reached the server.
#[derive(Debug)]
pub enum RestResponse {
  /// 2xx with the decoded JSON body (`Null` when empty).
  Ok(Value),
  /// 409: a uniqueness constraint rejected the write.
  Conflict(String),
}

/// Rate-limited HTTP client for the remote table API.
pub struct RestClient {
  /// Underlying HTTP client.
  http: Client,
  /// Project URL + access key.
  credentials: RemoteCredentials,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
}

impl RestClient {
  /// Create a new REST client.
  pub fn new(credentials: RemoteCredentials, config: RestClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      http,
      credentials,
      semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
    })
  }

  /// URL of a table endpoint.
  pub fn table_url(&self, table: &str) -> String {
    format!("{}{REST_PREFIX}/{table}", self.credentials.base_url())
  }

  /// Start a request against a table with auth headers attached.
  pub fn request(&self, method: Method, table: &str) -> RequestBuilder {
    let request = self.http.request(method, self.table_url(table));
    self.credentials.authorize(request)
  }

  /// Send a request and map its status.
  ///
  /// 2xx → `Ok(body)`, 409 → `Conflict`, anything else → error.
  pub async fn execute(&self, request: RequestBuilder, table: &str) -> Result<RestResponse> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .context("Semaphore closed")?;

    let response = request
      .send()
      .await
      .with_context(|| format!("Request to {table} failed"))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .with_context(|| format!("Failed to read {table} response body"))?;

    match status {
      s if s.is_success() => {
        debug!(table, status = %s, bytes = body.len(), "Store request ok");
        if body.trim().is_empty() {
          return Ok(RestResponse::Ok(Value::Null));
        }
        let value = serde_json::from_str(&body)
          .with_context(|| format!("Failed to parse {table} response JSON"))?;
        Ok(RestResponse::Ok(value))
      }
      StatusCode::CONFLICT => {
        warn!(table, "Store rejected write on conflict");
        Ok(RestResponse::Conflict(body))
      }
      s => Err(anyhow::anyhow!("Store API error {s} on {table}: {body}")),
    }
  }

  /// Check if the API is reachable.
  pub async fn health_check(&self) -> bool {
    let request = self
      .http
      .get(format!("{}{REST_PREFIX}/", self.credentials.base_url()));
    match self.credentials.authorize(request).send().await {
      Ok(response) => !response.status().is_server_error(),
      Err(e) => {
        warn!(error = %e, "Store health check failed");
        false
      }
    }
  }
}
