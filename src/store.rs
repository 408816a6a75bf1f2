//! Key-value blob persistence and the record store built on it.
//!
//! Every mutation rewrites the whole list under its key. There is a single
//! writer (this process), so no locking or conflict handling is done here.

use crate::db;
use crate::error::{HomeworkError, HomeworkResult};
use crate::model::HomeworkRecord;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
#[cfg(test)]
use std::cell::{Cell, RefCell};
#[cfg(test)]
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

pub const RECORDS_KEY: &str = "homework_records";

pub trait BlobStore {
    fn load(&self, key: &str) -> HomeworkResult<Option<serde_json::Value>>;
    fn save(&self, key: &str, value: &serde_json::Value) -> HomeworkResult<()>;
}

/// Blob store backed by the workspace SQLite file.
#[derive(Clone)]
pub struct SqliteBlobStore {
    conn: Rc<Connection>,
}

impl SqliteBlobStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Rc::new(conn),
        }
    }
}

impl BlobStore for SqliteBlobStore {
    fn load(&self, key: &str) -> HomeworkResult<Option<serde_json::Value>> {
        db::kv_get_json(&self.conn, key).map_err(|e| HomeworkError::storage(key, e))
    }

    fn save(&self, key: &str, value: &serde_json::Value) -> HomeworkResult<()> {
        db::kv_set_json(&self.conn, key, value).map_err(|e| HomeworkError::storage(key, e))
    }
}

/// In-process blob store. Clones share the same map.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Rc<RefCell<HashMap<String, serde_json::Value>>>,
    fail_writes: Rc<Cell<bool>>,
}

#[cfg(test)]
impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.blobs.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: serde_json::Value) {
        self.blobs.borrow_mut().insert(key.to_string(), value);
    }

    /// Makes every subsequent `save` fail, to exercise storage error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

#[cfg(test)]
impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> HomeworkResult<Option<serde_json::Value>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &serde_json::Value) -> HomeworkResult<()> {
        if self.fail_writes.get() {
            return Err(HomeworkError::storage(key, "writes disabled"));
        }
        self.insert(key, value.clone());
        Ok(())
    }
}

/// Loads a JSON list stored under `key`. `None` when the key was never written.
pub(crate) fn load_list<T, S>(store: &S, key: &str) -> HomeworkResult<Option<Vec<T>>>
where
    T: DeserializeOwned,
    S: BlobStore,
{
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    serde_json::from_value(raw)
        .map(Some)
        .map_err(|e| HomeworkError::storage(key, format!("undecodable blob: {e}")))
}

pub(crate) fn save_list<T, S>(store: &S, key: &str, items: &[T]) -> HomeworkResult<()>
where
    T: Serialize,
    S: BlobStore,
{
    let value = serde_json::to_value(items).map_err(|e| HomeworkError::storage(key, e))?;
    store.save(key, &value).inspect_err(|e| {
        warn!(key, error = %e, "failed to persist blob");
    })
}

pub struct RecordStore<S> {
    store: S,
    records: Vec<HomeworkRecord>,
}

impl<S: BlobStore> RecordStore<S> {
    /// Reads the persisted list; an absent key starts an empty store.
    pub fn open(store: S) -> HomeworkResult<Self> {
        let records = load_list(&store, RECORDS_KEY)?.unwrap_or_default();
        debug!(count = records.len(), "loaded homework records");
        Ok(Self { store, records })
    }

    /// In-memory state is updated even when the write fails.
    pub fn append(&mut self, records: Vec<HomeworkRecord>) -> HomeworkResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.records.extend(records);
        self.persist()
    }

    /// Removes the record with `id`. Absent ids are a no-op and return `false`.
    pub fn remove(&mut self, id: &str) -> HomeworkResult<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Records in insertion order. Callers sort explicitly.
    pub fn all(&self) -> &[HomeworkRecord] {
        &self.records
    }

    pub fn latest_updated_at(&self) -> Option<i64> {
        self.records.iter().map(|r| r.updated_at).max()
    }

    fn persist(&self) -> HomeworkResult<()> {
        save_list(&self.store, RECORDS_KEY, &self.records)
    }
}
