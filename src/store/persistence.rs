//! Persistence layer for the Record Store

use crate::error::StorageError;
use crate::record::Record;
use crate::store::RecordStore;
use crate::types::RecordId;
use std::marker::PhantomData;
use std::path::Path;

/// Sled-based implementation of RecordStore
///
/// Each collection uses two trees: `<collection>` maps a big-endian sequence
/// number to the JSON-encoded record, so iteration follows insertion order,
/// and `<collection>:ids` maps record ids to their sequence key.
pub struct SledRecordStore<R> {
    db: sled::Db,
    records: sled::Tree,
    ids: sled::Tree,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> SledRecordStore<R> {
    /// Open the collection for `R` inside an already open database.
    pub fn new(db: &sled::Db) -> Result<Self, StorageError> {
        let records = db.open_tree(R::COLLECTION)?;
        let ids = db.open_tree(format!("{}:ids", R::COLLECTION))?;
        Ok(Self {
            db: db.clone(),
            records,
            ids,
            _record: PhantomData,
        })
    }

    /// Open (or create) a database at `path` and the collection for `R` in it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Self::new(&db)
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<R, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<R: Record> RecordStore<R> for SledRecordStore<R> {
    fn get(&self, id: &RecordId) -> Result<Option<R>, StorageError> {
        let Some(seq_key) = self.ids.get(id.as_str().as_bytes())? else {
            return Ok(None);
        };
        match self.records.get(&seq_key)? {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Err(StorageError::Corrupt(format!(
                "{} id {} points at a missing record",
                R::COLLECTION,
                id
            ))),
        }
    }

    fn put(&self, record: &R) -> Result<(), StorageError> {
        let value = serde_json::to_vec(record)?;
        let id_key = record.id().as_str().as_bytes();

        let seq_key = match self.ids.get(id_key)? {
            Some(existing) => existing.to_vec(),
            None => {
                let seq = self.db.generate_id()?;
                let seq_key = seq.to_be_bytes().to_vec();
                self.ids.insert(id_key, seq_key.as_slice())?;
                seq_key
            }
        };
        self.records.insert(seq_key, value)?;
        Ok(())
    }

    fn scan(&self) -> Result<Vec<R>, StorageError> {
        self.records
            .iter()
            .values()
            .map(|value| Self::decode(&value?))
            .collect()
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.records.len())
    }
}
