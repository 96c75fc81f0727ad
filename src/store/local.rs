/// Local durable backing
use crate::{
    error::{ClinicError, ClinicResult},
    models::{generate_id, Entity},
    storage::{encode_rows, load_collection, KeyValueStore, StorageKeys},
    store::{replace_row, without_row, Backing, Change},
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::task;

/// Mirrors the whole set into one key of a `KeyValueStore`
///
/// Every mutation writes the full set through before returning. Store calls
/// run on the blocking pool since `FileStore` does plain file IO.
pub struct LocalBacking<T: Entity> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    _entity: std::marker::PhantomData<fn() -> T>,
}

impl<T: Entity> LocalBacking<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        Self {
            store,
            key: keys.collection::<T>(),
            _entity: std::marker::PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn persist(&self, rows: &[T]) -> ClinicResult<()> {
        let encoded = encode_rows(rows)?;
        let store = Arc::clone(&self.store);
        let key = self.key.clone();

        task::spawn_blocking(move || store.set(&key, &encoded))
            .await
            .map_err(|e| ClinicError::Internal(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl<T: Entity> Backing<T> for LocalBacking<T> {
    async fn load(&self) -> ClinicResult<Vec<T>> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();

        task::spawn_blocking(move || load_collection::<T>(store.as_ref(), &key))
            .await
            .map_err(|e| ClinicError::Internal(format!("Storage task failed: {}", e)))?
    }

    async fn insert(&self, current: &[T], draft: T::Draft) -> ClinicResult<Change<T>> {
        let row = T::from_draft(generate_id(), Utc::now(), draft);

        let mut rows = current.to_vec();
        rows.push(row.clone());
        self.persist(&rows).await?;

        Ok(Change { row, rows })
    }

    async fn update(
        &self,
        current: &[T],
        id: &str,
        patch: &T::Patch,
    ) -> ClinicResult<Option<Change<T>>> {
        let Some(existing) = current.iter().find(|row| row.id() == id) else {
            return Ok(None);
        };

        let mut row = existing.clone();
        row.apply_patch(patch);

        let rows = replace_row(current, id, &row);
        self.persist(&rows).await?;

        Ok(Some(Change { row, rows }))
    }

    async fn remove(&self, current: &[T], id: &str) -> ClinicResult<Option<Vec<T>>> {
        if !current.iter().any(|row| row.id() == id) {
            return Ok(None);
        }

        let rows = without_row(current, id);
        self.persist(&rows).await?;

        Ok(Some(rows))
    }

    fn is_remote(&self) -> bool {
        false
    }
}
