//! Local Store - JSON Bucket Fallback Persistence
//!
//! One bucket per collection, each a JSON array of records. Buckets live
//! in memory and, when a data directory is configured, are mirrored to
//! `{data_dir}/{bucket}.json` using atomic writes (write to tmp file,
//! then rename). Every write serializes the whole affected bucket.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::ports::store::{
  Collection, ConflictCheck, DocumentStore, Filter, ID_FIELD, RecordChange, StoreError,
  field_str, merge_fields,
};

type Buckets = HashMap<Collection, Vec<Value>>;

/// In-process document store with optional file persistence.
///
/// All buckets sit behind one mutex, so every store call (including
/// upsert and replace-all) is atomic within the process. A bucket is
/// swapped in memory only after its file write succeeded.
pub struct LocalStore {
  /// Directory holding `{bucket}.json` files. `None` = memory only.
  data_dir: Option<PathBuf>,
  buckets: Mutex<Buckets>,
}

impl LocalStore {
  /// Memory-only store. Nothing survives the process.
  pub fn in_memory() -> Self {
    Self {
      data_dir: None,
      buckets: Mutex::new(Buckets::new()),
    }
  }

  /// Open a file-backed store in the given data directory.
  ///
  /// Creates the directory if it doesn't exist and loads any bucket
  /// files already present.
  pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
    let dir = data_dir.as_ref();
    fs::create_dir_all(dir)
      .await
      .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

    let mut buckets = Buckets::new();
    for collection in Collection::ALL {
      let path = bucket_path(dir, collection);
      if !path.exists() {
        continue;
      }
      let json = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read bucket {}", path.display()))?;
      let records: Vec<Value> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse bucket {}", path.display()))?;
      buckets.insert(collection, records);
    }

    info!(
      path = %dir.display(),
      buckets = buckets.len(),
      "Local store opened"
    );

    Ok(Self {
      data_dir: Some(dir.to_path_buf()),
      buckets: Mutex::new(buckets),
    })
  }

  /// Whether writes are mirrored to disk.
  pub fn is_persistent(&self) -> bool {
    self.data_dir.is_some()
  }

  /// Write a bucket atomically (tmp → rename). No-op in memory mode.
  async fn persist(&self, collection: Collection, records: &[Value]) -> Result<()> {
    let Some(dir) = &self.data_dir else {
      return Ok(());
    };

    let path = bucket_path(dir, collection);
    let tmp_path = path.with_extension("json.tmp");

    let json = serde_json::to_string_pretty(records)
      .with_context(|| format!("Failed to serialize bucket {collection}"))?;

    fs::write(&tmp_path, &json)
      .await
      .with_context(|| format!("Failed to write tmp bucket {}", tmp_path.display()))?;

    fs::rename(&tmp_path, &path)
      .await
      .with_context(|| format!("Failed to rename bucket {}", path.display()))?;

    debug!(bucket = %collection, count = records.len(), "Bucket saved");
    Ok(())
  }

  /// Persist `records` then make them the live bucket.
  async fn commit(
    &self,
    buckets: &mut Buckets,
    collection: Collection,
    records: Vec<Value>,
  ) -> Result<(), StoreError> {
    self.persist(collection, &records).await?;
    buckets.insert(collection, records);
    Ok(())
  }
}

fn bucket_path(dir: &Path, collection: Collection) -> PathBuf {
  dir.join(format!("{}.json", collection.name()))
}

fn position_of(records: &[Value], field: &str, key: &str) -> Option<usize> {
  records.iter().position(|r| field_str(r, field) == Some(key))
}

fn refused(collection: Collection) -> StoreError {
  StoreError::Conflict {
    collection,
    detail: "rejected by conflict check".to_string(),
  }
}

#[async_trait]
impl DocumentStore for LocalStore {
  async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
    let buckets = self.buckets.lock().await;
    Ok(buckets.get(&collection).cloned().unwrap_or_default())
  }

  async fn list_where(
    &self,
    collection: Collection,
    filter: &Filter,
  ) -> Result<Vec<Value>, StoreError> {
    let buckets = self.buckets.lock().await;
    Ok(
      buckets
        .get(&collection)
        .map(|records| records.iter().filter(|r| filter.matches(r)).cloned().collect())
        .unwrap_or_default(),
    )
  }

  async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
    let buckets = self.buckets.lock().await;
    Ok(
      buckets
        .get(&collection)
        .and_then(|records| records.iter().find(|r| field_str(r, ID_FIELD) == Some(id)))
        .cloned(),
    )
  }

  #[instrument(skip(self, record), fields(bucket = %collection))]
  async fn insert(&self, collection: Collection, record: Value) -> Result<Value, StoreError> {
    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();
    records.push(record.clone());
    self.commit(&mut buckets, collection, records).await?;
    Ok(record)
  }

  #[instrument(skip(self, patch), fields(bucket = %collection))]
  async fn update(
    &self,
    collection: Collection,
    id: &str,
    patch: Value,
  ) -> Result<Option<Value>, StoreError> {
    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();

    let Some(index) = position_of(&records, ID_FIELD, id) else {
      return Ok(None);
    };
    let Some(record) = records.get_mut(index) else {
      return Ok(None);
    };
    merge_fields(record, &patch);
    let merged = record.clone();

    self.commit(&mut buckets, collection, records).await?;
    Ok(Some(merged))
  }

  #[instrument(skip(self, change), fields(bucket = %collection))]
  async fn modify(
    &self,
    collection: Collection,
    id: &str,
    change: RecordChange,
  ) -> Result<Option<Value>, StoreError> {
    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();

    let Some(index) = position_of(&records, ID_FIELD, id) else {
      return Ok(None);
    };
    let Some(record) = records.get_mut(index) else {
      return Ok(None);
    };
    if !change(record) {
      debug!(id, "Record unchanged, skipping write");
      return Ok(buckets.get(&collection).and_then(|b| b.get(index)).cloned());
    }
    let stored = record.clone();

    self.commit(&mut buckets, collection, records).await?;
    Ok(Some(stored))
  }

  #[instrument(skip(self, record, conflict), fields(bucket = %collection))]
  async fn insert_unless(
    &self,
    collection: Collection,
    record: Value,
    conflict: ConflictCheck,
  ) -> Result<Value, StoreError> {
    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();
    if conflict(records.as_slice()) {
      return Err(refused(collection));
    }

    records.push(record.clone());
    self.commit(&mut buckets, collection, records).await?;
    Ok(record)
  }

  #[instrument(skip(self, patch, conflict), fields(bucket = %collection))]
  async fn update_unless(
    &self,
    collection: Collection,
    id: &str,
    patch: Value,
    conflict: ConflictCheck,
  ) -> Result<Option<Value>, StoreError> {
    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();

    let Some(index) = position_of(&records, ID_FIELD, id) else {
      return Ok(None);
    };
    if conflict(records.as_slice()) {
      return Err(refused(collection));
    }
    let Some(record) = records.get_mut(index) else {
      return Ok(None);
    };
    merge_fields(record, &patch);
    let merged = record.clone();

    self.commit(&mut buckets, collection, records).await?;
    Ok(Some(merged))
  }

  #[instrument(skip(self), fields(bucket = %collection))]
  async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();

    let before = records.len();
    records.retain(|r| field_str(r, ID_FIELD) != Some(id));
    if records.len() == before {
      return Ok(());
    }

    self.commit(&mut buckets, collection, records).await
  }

  #[instrument(skip(self, record, on_insert), fields(bucket = %collection))]
  async fn upsert(
    &self,
    collection: Collection,
    key_field: &str,
    record: Value,
    on_insert: Value,
  ) -> Result<Value, StoreError> {
    let key = field_str(&record, key_field)
      .map(str::to_string)
      .ok_or_else(|| anyhow::anyhow!("upsert record has no string `{key_field}`"))?;

    let mut buckets = self.buckets.lock().await;
    let mut records = buckets.get(&collection).cloned().unwrap_or_default();

    let stored = match position_of(&records, key_field, &key) {
      Some(index) => {
        let existing = &mut records[index];
        merge_fields(existing, &record);
        existing.clone()
      }
      None => {
        let mut fresh = on_insert;
        merge_fields(&mut fresh, &record);
        records.push(fresh.clone());
        fresh
      }
    };

    self.commit(&mut buckets, collection, records).await?;
    Ok(stored)
  }

  #[instrument(skip(self, records), fields(bucket = %collection, count = records.len()))]
  async fn replace_all(
    &self,
    collection: Collection,
    records: Vec<Value>,
  ) -> Result<Vec<Value>, StoreError> {
    let mut buckets = self.buckets.lock().await;
    self.commit(&mut buckets, collection, records.clone()).await?;
    Ok(records)
  }

  /// Check that the data directory is writable (always true in memory).
  async fn is_healthy(&self) -> bool {
    let Some(dir) = &self.data_dir else {
      return true;
    };
    let test_path = dir.join(".health_check");
    let result = fs::write(&test_path, b"ok").await;
    let _ = fs::remove_file(&test_path).await;
    result.is_ok()
  }
}
