//! Persistence Adapters - Local JSON Fallback Storage
//!
//! Implements the `DocumentStore` port with in-process JSON buckets,
//! optionally mirrored to one atomic JSON file per collection.
//! Used when no remote store is configured.

pub mod local_store;

pub use local_store::LocalStore;
