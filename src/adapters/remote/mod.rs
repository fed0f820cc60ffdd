//! Remote Document Store Adapter
//!
//! Implements the `DocumentStore` port against a hosted table API
//! (PostgREST-style REST endpoints under `/rest/v1`).
//!
//! Sub-modules:
//! - `auth`: base URL + access key, request authorization
//! - `client`: HTTP client with concurrency limit and status mapping
//! - `store`: the port implementation

pub mod auth;
pub mod client;
pub mod store;

pub use auth::RemoteCredentials;
pub use client::{RestClient, RestClientConfig};
pub use store::RemoteStore;
