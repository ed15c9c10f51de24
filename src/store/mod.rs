//! Record Store
//!
//! Lookup storage for contexts and events. The store owns persistence and
//! applies the forwarded filter document, after group scoping when a caller
//! identity is given; ordering is applied by the caller.

pub mod persistence;

pub use persistence::SledRecordStore;

use crate::access::{filter_visible, Identity};
use crate::error::StorageError;
use crate::query::FilterDocument;
use crate::record::Record;
use crate::types::{RecordId, Timestamp};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Record store interface, one instance per collection.
pub trait RecordStore<R: Record>: Send + Sync {
    fn get(&self, id: &RecordId) -> Result<Option<R>, StorageError>;

    /// Insert or replace a record. Replacing keeps the record's position.
    fn put(&self, record: &R) -> Result<(), StorageError>;

    /// All records in store order.
    fn scan(&self) -> Result<Vec<R>, StorageError>;

    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Records whose document at `now` matches `filter`, in store order.
    fn find(&self, filter: &FilterDocument, now: Timestamp) -> Result<Vec<R>, StorageError> {
        Ok(matching(self.scan()?, filter, now))
    }

    /// Like [`RecordStore::find`], restricted to records `identity` may read
    /// in `game`. Scoping runs first, so hidden records are never evaluated.
    fn find_visible(
        &self,
        filter: &FilterDocument,
        now: Timestamp,
        identity: &Identity,
        game: &str,
    ) -> Result<Vec<R>, StorageError> {
        let scoped = filter_visible(self.scan()?, identity, game);
        Ok(matching(scoped, filter, now))
    }
}

fn matching<R: Record>(records: Vec<R>, filter: &FilterDocument, now: Timestamp) -> Vec<R> {
    if filter.is_match_all() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| filter.matches(&record.listing_document(now)))
        .collect()
}

/// In-memory arena of records keyed by id, kept in insertion order.
pub struct MemoryRecordStore<R> {
    inner: RwLock<Arena<R>>,
}

struct Arena<R> {
    records: Vec<R>,
    index: HashMap<RecordId, usize>,
}

impl<R: Record> MemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arena {
                records: Vec::new(),
                index: HashMap::new(),
            }),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let store = Self::new();
        {
            let mut arena = store.inner.write();
            for record in records {
                arena.upsert(record);
            }
        }
        store
    }
}

impl<R: Record> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Arena<R> {
    fn upsert(&mut self, record: R) {
        match self.index.get(record.id()) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(record.id().clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}

impl<R: Record> RecordStore<R> for MemoryRecordStore<R> {
    fn get(&self, id: &RecordId) -> Result<Option<R>, StorageError> {
        let arena = self.inner.read();
        Ok(arena.index.get(id).map(|&slot| arena.records[slot].clone()))
    }

    fn put(&self, record: &R) -> Result<(), StorageError> {
        self.inner.write().upsert(record.clone());
        Ok(())
    }

    fn scan(&self) -> Result<Vec<R>, StorageError> {
        Ok(self.inner.read().records.clone())
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.inner.read().records.len())
    }
}
