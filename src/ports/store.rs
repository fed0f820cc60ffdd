//! Document Store Port - Collection Persistence Interface
//!
//! Defines the storage contract the gateway runs its business rules
//! against. Records cross the boundary as JSON objects so one trait
//! covers every collection; typing happens in the gateway.
//!
//! Two adapters implement it: the remote REST store and the local
//! JSON-bucket fallback. Which one backs a gateway is decided once,
//! at construction.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Field every collection except `SiteAds` is keyed by.
pub const ID_FIELD: &str = "id";

/// The fixed set of collections (one bucket / table each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Teams,
  Posts,
  Messages,
  News,
  SiteAds,
  Matches,
}

impl Collection {
  /// Every collection, in a stable order.
  pub const ALL: [Self; 6] = [
    Self::Teams,
    Self::Posts,
    Self::Messages,
    Self::News,
    Self::SiteAds,
    Self::Matches,
  ];

  /// Bucket / table name.
  pub fn name(self) -> &'static str {
    match self {
      Self::Teams => "teams",
      Self::Posts => "posts",
      Self::Messages => "messages",
      Self::News => "news",
      Self::SiteAds => "site_ads",
      Self::Matches => "matches",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Which backend a gateway was bound to at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
  /// Remote REST store (URL and key configured).
  Remote,
  /// Local JSON buckets (credentials absent).
  Fallback,
}

impl StoreMode {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Remote => "remote",
      Self::Fallback => "fallback",
    }
  }
}

impl fmt::Display for StoreMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Failure reported by a store adapter.
#[derive(Debug, Error)]
pub enum StoreError {
  /// I/O, transport or non-success response. Not retried.
  #[error(transparent)]
  Unavailable(#[from] anyhow::Error),

  /// The store rejected a write on a uniqueness constraint.
  #[error("conflict in {collection}: {detail}")]
  Conflict {
    collection: Collection,
    detail: String,
  },
}

/// Edit applied to one record in place. Returns `true` when it changed
/// the record (only then is it written back).
pub type RecordChange = Box<dyn FnOnce(&mut Value) -> bool + Send>;

/// Predicate over a whole collection. Returns `true` when a write must
/// be refused.
pub type ConflictCheck = Box<dyn Fn(&[Value]) -> bool + Send>;

/// Row filter for `list_where`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  /// `field` equals `value`, ignoring case and surrounding whitespace.
  EqIgnoreCase { field: &'static str, value: String },
  /// At least one of `fields` equals `value` exactly.
  AnyEq {
    fields: &'static [&'static str],
    value: String,
  },
}

impl Filter {
  /// Whether `record` passes the filter.
  pub fn matches(&self, record: &Value) -> bool {
    match self {
      Self::EqIgnoreCase { field, value } => field_str(record, field)
        .is_some_and(|v| v.trim().to_lowercase() == value.trim().to_lowercase()),
      Self::AnyEq { fields, value } => fields
        .iter()
        .any(|field| field_str(record, field) == Some(value.as_str())),
    }
  }
}

/// Trait for document store providers.
///
/// Records are JSON objects. `get`, `update`, `modify` and `delete`
/// address a record by its `id` field. Each call is one logical store
/// operation.
///
/// `modify`, `insert_unless` and `update_unless` read and write under one
/// lock in the local store. The remote store runs them as a read followed
/// by a write, so concurrent remote callers race with last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
  /// Load every record of a collection, in storage order.
  async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

  /// Load the records passing `filter`, in storage order.
  ///
  /// May return a superset (remote pattern matching); callers refine.
  async fn list_where(
    &self,
    collection: Collection,
    filter: &Filter,
  ) -> Result<Vec<Value>, StoreError>;

  /// Load one record by id.
  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

  /// Insert a complete record and return it as stored.
  async fn insert(&self, collection: Collection, record: Value) -> Result<Value, StoreError>;

  /// Shallow-merge `patch` into the record with this id.
  ///
  /// Returns `None` when no record has the id.
  async fn update(
    &self,
    collection: Collection,
    id: &str,
    patch: Value,
  ) -> Result<Option<Value>, StoreError>;

  /// Run `change` on the record with this id and write it back if it
  /// reports a change. Returns the record as stored, `None` when absent.
  async fn modify(
    &self,
    collection: Collection,
    id: &str,
    change: RecordChange,
  ) -> Result<Option<Value>, StoreError>;

  /// Insert `record` unless `conflict` holds for the current collection,
  /// in which case `StoreError::Conflict` is returned and nothing is written.
  async fn insert_unless(
    &self,
    collection: Collection,
    record: Value,
    conflict: ConflictCheck,
  ) -> Result<Value, StoreError>;

  /// `update`, refused with `StoreError::Conflict` when `conflict` holds
  /// for the current collection.
  async fn update_unless(
    &self,
    collection: Collection,
    id: &str,
    patch: Value,
    conflict: ConflictCheck,
  ) -> Result<Option<Value>, StoreError>;

  /// Hard-delete by id. Deleting a missing id is not an error.
  async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

  /// Insert-or-update keyed by `key_field`.
  ///
  /// When a record with the same key exists, `record` is merged into it
  /// and its other fields are kept. Otherwise a new record is written
  /// from `on_insert` overlaid with `record`.
  async fn upsert(
    &self,
    collection: Collection,
    key_field: &str,
    record: Value,
    on_insert: Value,
  ) -> Result<Value, StoreError>;

  /// Delete every record, then insert `records`. Returns them as stored.
  async fn replace_all(
    &self,
    collection: Collection,
    records: Vec<Value>,
  ) -> Result<Vec<Value>, StoreError>;

  /// Check if the store is reachable / writable.
  async fn is_healthy(&self) -> bool;
}

/// Shallow merge: top-level fields of `patch` overwrite those of `target`.
///
/// Non-object values are left alone.
pub fn merge_fields(target: &mut Value, patch: &Value) {
  if let (Some(dst), Some(src)) = (target.as_object_mut(), patch.as_object()) {
    for (key, value) in src {
      dst.insert(key.clone(), value.clone());
    }
  }
}

/// Read a record's string field (e.g. its id or zone).
pub fn field_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
  record.get(field).and_then(Value::as_str)
}
