//! Remote Store — REST Adapter for the DocumentStore Port
//!
//! Maps each port call onto the remote table API (PostgREST
//! conventions): filters as `field=eq.value` query params, writes with
//! `Prefer: return=representation` so the stored row comes back.
//!
//! Request counts per call: one, except `upsert` (insert-if-absent +
//! patch, each atomic server-side), `replace_all` (delete + insert) and
//! the read-then-write calls `modify`, `insert_unless` and
//! `update_unless`. Those last three are not atomic here: concurrent
//! callers race with last-write-wins.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::client::{RestClient, RestResponse};
use crate::ports::store::{
    Collection, ConflictCheck, DocumentStore, Filter, ID_FIELD, RecordChange, StoreError,
    field_str, merge_fields,
};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Remote document store backed by the shared REST client.
pub struct RemoteStore {
    client: Arc<RestClient>,
}

impl RemoteStore {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        collection: Collection,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, StoreError> {
        match self.client.execute(request, collection.name()).await? {
            RestResponse::Ok(body) => Ok(body),
            RestResponse::Conflict(detail) => Err(StoreError::Conflict { collection, detail }),
        }
    }
}

/// Turn a `filter=eq.value` pair into a query parameter.
fn eq_filter(field: &str, value: &str) -> [(String, String); 1] {
    [(field.to_string(), format!("eq.{value}"))]
}

/// Query parameter for a row filter.
///
/// `ilike` still treats `*` as a wildcard, so the match can be wider
/// than the filter; callers refine.
fn filter_query(filter: &Filter) -> (String, String) {
    match filter {
        Filter::EqIgnoreCase { field, value } => {
            ((*field).to_string(), format!("ilike.{}", escape_like(value.trim())))
        }
        Filter::AnyEq { fields, value } => {
            let quoted = quote_value(value);
            let terms: Vec<String> = fields.iter().map(|f| format!("{f}.eq.{quoted}")).collect();
            ("or".to_string(), format!("({})", terms.join(",")))
        }
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Double-quote a value inside an `or=(...)` list.
fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn refused(collection: Collection) -> StoreError {
    StoreError::Conflict {
        collection,
        detail: "rejected by conflict check".to_string(),
    }
}

/// Rows come back as a JSON array; take the first.
fn first_row(body: Value) -> Option<Value> {
    match body {
        Value::Array(rows) => rows.into_iter().next(),
        Value::Null => None,
        other => Some(other),
    }
}

fn into_rows(body: Value) -> Vec<Value> {
    match body {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[async_trait]
impl DocumentStore for RemoteStore {
    #[instrument(skip(self), fields(table = %collection))]
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let request = self
            .client
            .request(Method::GET, collection.name())
            .query(&[("select", "*")]);
        Ok(into_rows(self.send(collection, request).await?))
    }

    #[instrument(skip(self, filter), fields(table = %collection))]
    async fn list_where(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let request = self
            .client
            .request(Method::GET, collection.name())
            .query(&[("select", "*")])
            .query(&[filter_query(filter)]);
        Ok(into_rows(self.send(collection, request).await?))
    }

    #[instrument(skip(self), fields(table = %collection))]
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let request = self
            .client
            .request(Method::GET, collection.name())
            .query(&[("select", "*")])
            .query(&eq_filter(ID_FIELD, id));
        Ok(first_row(self.send(collection, request).await?))
    }

    #[instrument(skip(self, record), fields(table = %collection))]
    async fn insert(&self, collection: Collection, record: Value) -> Result<Value, StoreError> {
        let request = self
            .client
            .request(Method::POST, collection.name())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record);
        let stored = first_row(self.send(collection, request).await?);
        Ok(stored.unwrap_or(record))
    }

    #[instrument(skip(self, patch), fields(table = %collection))]
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, StoreError> {
        let request = self
            .client
            .request(Method::PATCH, collection.name())
            .query(&eq_filter(ID_FIELD, id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        Ok(first_row(self.send(collection, request).await?))
    }

    /// Read, edit, then patch the whole record back.
    #[instrument(skip(self, change), fields(table = %collection))]
    async fn modify(
        &self,
        collection: Collection,
        id: &str,
        change: RecordChange,
    ) -> Result<Option<Value>, StoreError> {
        let Some(mut record) = self.get(collection, id).await? else {
            return Ok(None);
        };
        let original = record.clone();
        if !change(&mut record) {
            debug!(id, "Record unchanged, skipping write");
            return Ok(Some(original));
        }
        self.update(collection, id, record).await
    }

    #[instrument(skip(self, record, conflict), fields(table = %collection))]
    async fn insert_unless(
        &self,
        collection: Collection,
        record: Value,
        conflict: ConflictCheck,
    ) -> Result<Value, StoreError> {
        let existing = self.list(collection).await?;
        if conflict(existing.as_slice()) {
            return Err(refused(collection));
        }
        self.insert(collection, record).await
    }

    #[instrument(skip(self, patch, conflict), fields(table = %collection))]
    async fn update_unless(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
        conflict: ConflictCheck,
    ) -> Result<Option<Value>, StoreError> {
        let existing = self.list(collection).await?;
        if conflict(existing.as_slice()) {
            return Err(refused(collection));
        }
        self.update(collection, id, patch).await
    }

    #[instrument(skip(self), fields(table = %collection))]
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let request = self
            .client
            .request(Method::DELETE, collection.name())
            .query(&eq_filter(ID_FIELD, id));
        self.send(collection, request).await?;
        Ok(())
    }

    /// Insert-if-absent on the key's unique constraint, then patch.
    ///
    /// Neither step can create a second row for the same key, even
    /// under concurrent callers.
    #[instrument(skip(self, record, on_insert), fields(table = %collection))]
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

        let mut fresh = on_insert;
        merge_fields(&mut fresh, &record);
        let seed = self
            .client
            .request(Method::POST, collection.name())
            .query(&[("on_conflict", key_field)])
            .header("Prefer", "resolution=ignore-duplicates")
            .json(&fresh);
        self.send(collection, seed).await?;

        let patch = self
            .client
            .request(Method::PATCH, collection.name())
            .query(&eq_filter(key_field, &key))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&record);
        first_row(self.send(collection, patch).await?).ok_or_else(|| {
            StoreError::Unavailable(anyhow::anyhow!(
                "upsert of {collection} `{key}` returned no row"
            ))
        })
    }

    #[instrument(skip(self, records), fields(table = %collection, count = records.len()))]
    async fn replace_all(
        &self,
        collection: Collection,
        records: Vec<Value>,
    ) -> Result<Vec<Value>, StoreError> {
        // The table API refuses unfiltered deletes; match every row instead.
        let clear = self
            .client
            .request(Method::DELETE, collection.name())
            .query(&[(ID_FIELD, "not.is.null")]);
        self.send(collection, clear).await?;

        if records.is_empty() {
            info!(table = %collection, "Collection cleared");
            return Ok(Vec::new());
        }

        let insert = self
            .client
            .request(Method::POST, collection.name())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&records);
        let stored = into_rows(self.send(collection, insert).await?);
        info!(table = %collection, count = stored.len(), "Collection replaced");
        Ok(if stored.is_empty() { records } else { stored })
    }

    async fn is_healthy(&self) -> bool {
        self.client.health_check().await
    }
}
