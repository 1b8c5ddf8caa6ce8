//! Generic CRUD store over one homogeneous record family.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::query::Query;
use super::snapshot::TableSink;

/// A record type an [`EntityStore`] can own.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable kind used in error messages ("Expense", "Todo").
    const KIND: &'static str;

    /// Table name in persisted snapshots.
    const TABLE: &'static str;

    /// Typed partial update listing only the mutable fields.
    type Update: Send;

    /// Store-assigned id.
    fn id(&self) -> u64;

    /// Assign the id on creation.
    fn set_id(&mut self, id: u64);

    /// Merge an update into the record.
    fn apply(&mut self, update: Self::Update);

    /// Check field invariants. Runs on create and after every mutation.
    fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// In-memory collection of `T` in insertion order, optionally mirrored to a
/// [`TableSink`].
///
/// Each operation takes the lock once and completes without interleaving
/// with other mutations. If the sink rejects a write, the in-memory change is
/// rolled back and the persistence error is returned.
pub struct EntityStore<T: Entity> {
    records: RwLock<Vec<T>>,
    sink: Option<Arc<dyn TableSink>>,
}

impl<T: Entity> EntityStore<T> {
    /// An empty, memory-only store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            sink: None,
        }
    }

    /// A store seeded with existing records and mirrored to `sink`.
    pub fn with_records(records: Vec<T>, sink: Option<Arc<dyn TableSink>>) -> Self {
        Self {
            records: RwLock::new(records),
            sink,
        }
    }

    /// Validate and store a new record, assigning `max(id) + 1`.
    pub async fn create(&self, mut record: T) -> StoreResult<T> {
        record.validate()?;

        let mut records = self.records.write().await;
        let id = records.iter().map(Entity::id).max().map_or(1, |max| max + 1);
        record.set_id(id);
        records.push(record.clone());

        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }

        debug!("Created {} {}", T::KIND, id);
        Ok(record)
    }

    /// Store several records atomically: either all are stored or none.
    pub async fn create_all(&self, drafts: Vec<T>) -> StoreResult<Vec<T>> {
        for draft in &drafts {
            draft.validate()?;
        }

        let mut records = self.records.write().await;
        let original_len = records.len();
        let mut next = records.iter().map(Entity::id).max().unwrap_or(0);

        let mut created = Vec::with_capacity(drafts.len());
        for mut record in drafts {
            next += 1;
            record.set_id(next);
            records.push(record.clone());
            created.push(record);
        }

        if let Err(e) = self.persist(&records).await {
            records.truncate(original_len);
            return Err(e);
        }

        debug!("Created {} {} records", created.len(), T::KIND);
        Ok(created)
    }

    /// Fetch a record by id.
    pub async fn find(&self, id: u64) -> StoreResult<T> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    /// Merge a typed partial update into a record.
    pub async fn update(&self, id: u64, update: T::Update) -> StoreResult<T> {
        self.modify(id, |record| {
            record.apply(update);
            Ok(())
        })
        .await
        .map(|(record, ())| record)
    }

    /// Mutate a record through a closure.
    ///
    /// The closure works on a copy. The copy is validated and only then
    /// replaces the stored record, so a failing closure or invalid result
    /// leaves the store unchanged.
    pub async fn modify<R, F>(&self, id: u64, mutate: F) -> StoreResult<(T, R)>
    where
        F: FnOnce(&mut T) -> StoreResult<R> + Send,
        R: Send,
    {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        let mut draft = records[index].clone();
        let outcome = mutate(&mut draft)?;
        draft.validate()?;

        let previous = std::mem::replace(&mut records[index], draft.clone());
        if let Err(e) = self.persist(&records).await {
            records[index] = previous;
            return Err(e);
        }

        debug!("Modified {} {}", T::KIND, id);
        Ok((draft, outcome))
    }

    /// Remove a record. Requires `confirmed`; the store is untouched otherwise.
    pub async fn delete(&self, id: u64, confirmed: bool) -> StoreResult<T> {
        if !confirmed {
            return Err(StoreError::ConfirmationRequired {
                entity: T::KIND,
                id,
            });
        }

        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))?;

        let removed = records.remove(index);
        if let Err(e) = self.persist(&records).await {
            records.insert(index, removed);
            return Err(e);
        }

        debug!("Deleted {} {}", T::KIND, id);
        Ok(removed)
    }

    /// Remove every record matching `predicate`, returning the removed ones.
    pub async fn remove_where<F>(&self, predicate: F) -> StoreResult<Vec<T>>
    where
        F: Fn(&T) -> bool + Send,
    {
        let mut records = self.records.write().await;
        let before = records.clone();
        let (removed, kept): (Vec<T>, Vec<T>) = records.drain(..).partition(|record| predicate(record));
        *records = kept;

        if removed.is_empty() {
            return Ok(removed);
        }

        if let Err(e) = self.persist(&records).await {
            *records = before;
            return Err(e);
        }

        debug!("Removed {} {} records", removed.len(), T::KIND);
        Ok(removed)
    }

    /// Snapshot of the records matching `query`.
    ///
    /// The result is owned, so it can be iterated as often as needed without
    /// holding the store lock.
    pub async fn query(&self, query: Query<'_, T>) -> Vec<T> {
        query.apply(self.records.read().await.iter())
    }

    /// Every record in insertion order.
    pub async fn all(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn persist(&self, records: &[T]) -> StoreResult<()> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };

        let rows = serde_json::to_value(records).map_err(|e| StoreError::persistence(e.to_string()))?;
        sink.write_table(T::TABLE, rows).await
    }
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
