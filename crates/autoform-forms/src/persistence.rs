//! The persistence collaborator contract.
//!
//! A [`RecordStore`] durably stores submitted payloads under a collection
//! path. The form engine never requires one: without a store (or without a
//! configured path) submissions are accepted locally and nothing is written.
//!
//! [`InMemoryRecordStore`] keeps records in process memory and is suitable
//! for single-process use and testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use autoform_core::PersistenceError;

use crate::store::Record;
use crate::submission::Payload;

/// A backend that creates and updates records.
///
/// All methods are async and the trait requires `Send + Sync` so a single
/// handle can be shared between form instances.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates or updates the record at `path`.
    ///
    /// With `key = None` a new record is created and its generated key is
    /// returned. With a key, the existing record is updated in place: fields
    /// in `payload` overwrite stored ones, other stored fields are kept.
    async fn create_or_update(
        &self,
        path: &str,
        key: Option<&str>,
        payload: &Payload,
    ) -> Result<String, PersistenceError>;

    /// Loads the record at `path`/`key`, or `None` if it does not exist.
    async fn fetch(&self, path: &str, key: &str) -> Result<Option<Record>, PersistenceError>;
}

/// A thread-safe in-memory record store.
///
/// Records are keyed by `(path, key)`; new keys are random UUIDs. Clones
/// share the same underlying records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<HashMap<(String, String), Record>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `message`.
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    /// Clears a failure set by [`fail_with`](Self::fail_with).
    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Inserts `record` at `path`/`key`, replacing any existing record.
    pub async fn insert(&self, path: &str, key: &str, record: Record) {
        self.records
            .write()
            .await
            .insert((path.to_string(), key.to_string()), record);
    }

    /// Returns the number of stored records across all paths.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn check_failure(&self) -> Result<(), PersistenceError> {
        match self.failure.read().await.as_deref() {
            Some(message) => Err(PersistenceError::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_or_update(
        &self,
        path: &str,
        key: Option<&str>,
        payload: &Payload,
    ) -> Result<String, PersistenceError> {
        self.check_failure().await?;
        let mut records = self.records.write().await;

        match key {
            None => {
                let key = uuid::Uuid::new_v4().to_string();
                records.insert((path.to_string(), key.clone()), payload.to_json());
                tracing::debug!(path, key = %key, "record created");
                Ok(key)
            }
            Some(key) => {
                let record = records
                    .get_mut(&(path.to_string(), key.to_string()))
                    .ok_or_else(|| {
                        PersistenceError::new(format!("Record '{key}' does not exist at '{path}'"))
                    })?;
                record.extend(payload.to_json());
                tracing::debug!(path, key, "record updated");
                Ok(key.to_string())
            }
        }
    }

    async fn fetch(&self, path: &str, key: &str) -> Result<Option<Record>, PersistenceError> {
        self.check_failure().await?;
        let records = self.records.read().await;
        Ok(records.get(&(path.to_string(), key.to_string())).cloned())
    }
}
