//! Three-tier data store.
//!
//! Reads fetch the remote table and the local JSON file in parallel and merge
//! them by id (local first, remote overwrites). If neither tier answered, the
//! in-memory collection (defaults plus this process's writes) is served.
//!
//! Writes go to every tier; tier failures are logged and swallowed, so the
//! last successful writer wins. There is no conflict resolution beyond that
//! map overwrite and no deletion tracking across tiers.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::db::error::{StoreError, StoreResult};
use crate::db::local::LocalStore;
use crate::db::memory::MemoryStore;
use crate::db::supabase::RemoteStore;

/// A flat record addressed by a numeric id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote table name and local file stem.
    const COLLECTION: &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Data served when no tier has anything for this collection.
    fn defaults() -> Vec<Self> {
        Vec::new()
    }
}

/// Union of two record sets keyed by id; entries from `remote` replace
/// entries from `local` with the same id. Result is sorted by id, descending.
pub fn merge_by_id<T: Record>(local: Vec<T>, remote: Vec<T>) -> Vec<T> {
    let mut by_id: BTreeMap<i64, T> = BTreeMap::new();
    for item in local.into_iter().chain(remote) {
        by_id.insert(item.id(), item);
    }
    by_id.into_values().rev().collect()
}

fn value_id(value: &Value) -> Option<i64> {
    match value.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Replace the entry with the same id, or append.
fn upsert_value(items: &mut Vec<Value>, value: Value) {
    let id = value_id(&value);
    match items
        .iter_mut()
        .find(|existing| id.is_some() && value_id(existing) == id)
    {
        Some(slot) => *slot = value,
        None => items.push(value),
    }
}

fn remove_value(items: &mut Vec<Value>, id: i64) {
    items.retain(|existing| value_id(existing) != Some(id));
}

/// Deserialize rows, skipping (and logging) the ones that do not fit `T`.
fn decode_rows<T: Record>(rows: Vec<Value>, tier: &str) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed {} row from {} tier: {}",
                    T::COLLECTION,
                    tier,
                    e
                );
                None
            }
        })
        .collect()
}

fn encode_defaults<T: Record>() -> Vec<Value> {
    T::defaults()
        .iter()
        .filter_map(|record| serde_json::to_value(record).ok())
        .collect()
}

fn log_tier_failure(tier: &str, op: &str, collection: &str, err: &StoreError) {
    if err.is_disabled() {
        tracing::debug!("{} tier skipped for {} {}", tier, op, collection);
    } else {
        tracing::warn!("{} tier failed for {} {}: {}", tier, op, collection, err);
    }
}

pub struct DataStore {
    remote: Arc<dyn RemoteStore>,
    local: LocalStore,
    memory: MemoryStore,
}

impl DataStore {
    pub fn new(remote: Arc<dyn RemoteStore>, local: LocalStore) -> Self {
        Self {
            remote,
            local,
            memory: MemoryStore::new(),
        }
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_enabled()
    }

    async fn fetch_remote<T: Record>(&self) -> Option<Vec<T>> {
        match self.remote.select(T::COLLECTION).await {
            Ok(rows) => Some(decode_rows(rows, "remote")),
            Err(e) => {
                log_tier_failure("Remote", "read", T::COLLECTION, &e);
                None
            }
        }
    }

    async fn fetch_local<T: Record>(&self) -> Option<Vec<T>> {
        match self.local.read(T::COLLECTION).await {
            Ok(Some(rows)) => Some(decode_rows(rows, "local")),
            Ok(None) => None,
            Err(e) => {
                log_tier_failure("Local", "read", T::COLLECTION, &e);
                None
            }
        }
    }

    async fn memory_snapshot<T: Record>(&self) -> Vec<Value> {
        self.memory
            .snapshot(T::COLLECTION, encode_defaults::<T>)
            .await
    }

    /// Starting contents for a local file that does not exist yet. Memory
    /// defaults are only carried over when the remote did not take the write.
    async fn local_seed<T: Record>(&self, remote_ok: bool) -> Vec<Value> {
        if remote_ok {
            Vec::new()
        } else {
            self.memory_snapshot::<T>().await
        }
    }

    /// Every record of a collection, newest id first.
    pub async fn list<T: Record>(&self) -> Vec<T> {
        let (remote, local) = futures::join!(self.fetch_remote::<T>(), self.fetch_local::<T>());

        match (remote, local) {
            (None, None) => {
                tracing::debug!(
                    "No remote or local data for {}, serving in-memory collection",
                    T::COLLECTION
                );
                let rows = self.memory_snapshot::<T>().await;
                merge_by_id(Vec::new(), decode_rows(rows, "memory"))
            }
            (remote, local) => merge_by_id(local.unwrap_or_default(), remote.unwrap_or_default()),
        }
    }

    pub async fn get<T: Record>(&self, id: i64) -> Option<T> {
        self.list::<T>().await.into_iter().find(|r| r.id() == id)
    }

    /// Id for a new record: the current time in milliseconds, bumped past any existing id.
    pub async fn next_id<T: Record>(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let max_existing = self
            .list::<T>()
            .await
            .iter()
            .map(Record::id)
            .max()
            .unwrap_or(0);
        now.max(max_existing + 1)
    }

    /// Write a record to every tier. Returns the record as stored (the remote
    /// representation when the remote accepted it).
    pub async fn upsert<T: Record>(&self, record: T) -> StoreResult<T> {
        let mut value = serde_json::to_value(&record)?;
        let mut stored = record;

        let remote_ok = match self.remote.upsert(T::COLLECTION, &value).await {
            Ok(row) => {
                match serde_json::from_value::<T>(row.clone()) {
                    Ok(remote_record) => {
                        stored = remote_record;
                        value = row;
                    }
                    Err(e) => tracing::warn!(
                        "Remote returned an unexpected {} row, keeping local copy: {}",
                        T::COLLECTION,
                        e
                    ),
                }
                true
            }
            Err(e) => {
                log_tier_failure("Remote", "write", T::COLLECTION, &e);
                false
            }
        };

        let seed = self.local_seed::<T>(remote_ok).await;
        let local_value = value.clone();
        if let Err(e) = self
            .local
            .update(T::COLLECTION, seed, move |items| {
                upsert_value(items, local_value)
            })
            .await
        {
            log_tier_failure("Local", "write", T::COLLECTION, &e);
        }

        self.memory
            .update(T::COLLECTION, encode_defaults::<T>, move |items| {
                upsert_value(items, value)
            })
            .await;

        Ok(stored)
    }

    /// Remove a record from every tier.
    pub async fn delete<T: Record>(&self, id: i64) -> StoreResult<()> {
        let remote_ok = match self.remote.delete(T::COLLECTION, id).await {
            Ok(()) => true,
            Err(e) => {
                log_tier_failure("Remote", "delete", T::COLLECTION, &e);
                false
            }
        };

        let seed = self.local_seed::<T>(remote_ok).await;
        if let Err(e) = self
            .local
            .update(T::COLLECTION, seed, |items| remove_value(items, id))
            .await
        {
            log_tier_failure("Local", "delete", T::COLLECTION, &e);
        }

        self.memory
            .update(T::COLLECTION, encode_defaults::<T>, |items| {
                remove_value(items, id)
            })
            .await;

        Ok(())
    }

    /// Pull a whole remote table and merge it into the local file
    /// (local-only rows survive, remote rows overwrite by id).
    ///
    /// Returns the number of records written locally.
    pub async fn mirror_collection<T: Record>(&self) -> StoreResult<usize> {
        let rows = self.remote.select(T::COLLECTION).await?;
        let remote: Vec<T> = decode_rows(rows, "remote");

        // Runs under the local write lock shared with upsert and delete.
        let mut written = 0;
        let mut encode_err = None;
        self.local
            .update(T::COLLECTION, Vec::new(), |items| {
                let local: Vec<T> = decode_rows(items.clone(), "local");
                let merged = merge_by_id(local, remote);
                match merged
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(values) => {
                        written = values.len();
                        *items = values;
                    }
                    Err(e) => encode_err = Some(e),
                }
            })
            .await?;

        match encode_err {
            Some(e) => Err(e.into()),
            None => Ok(written),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;

    /// In-process stand-in for Supabase; can be switched into a failing state.
    #[derive(Default)]
    pub struct FakeRemote {
        pub tables: Mutex<HashMap<String, Vec<Value>>>,
        pub failing: AtomicBool,
    }

    impl FakeRemote {
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> StoreResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StoreError::Remote("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        pub async fn seed(&self, table: &str, rows: Vec<Value>) {
            self.tables.lock().await.insert(table.to_string(), rows);
        }

        pub async fn rows(&self, table: &str) -> Vec<Value> {
            self.tables
                .lock()
                .await
                .get(table)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl RemoteStore for FakeRemote {
        fn is_enabled(&self) -> bool {
            true
        }

        async fn select(&self, table: &str) -> StoreResult<Vec<Value>> {
            self.check()?;
            Ok(self.rows(table).await)
        }

        async fn upsert(&self, table: &str, row: &Value) -> StoreResult<Value> {
            self.check()?;
            let mut tables = self.tables.lock().await;
            upsert_value(tables.entry(table.to_string()).or_default(), row.clone());
            Ok(row.clone())
        }

        async fn delete(&self, table: &str, id: i64) -> StoreResult<()> {
            self.check()?;
            let mut tables = self.tables.lock().await;
            remove_value(tables.entry(table.to_string()).or_default(), id);
            Ok(())
        }

        async fn upload(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> StoreResult<String> {
            self.check()?;
            Ok(format!("https://fake.supabase.co/storage/v1/object/public/bucket/{}", path))
        }
    }
}
