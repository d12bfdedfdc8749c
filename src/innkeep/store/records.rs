use parking_lot::Mutex;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Record;
use crate::error::{InnkeepError, Result};

/// Generic CRUD store over one JSON-array file.
///
/// Every mutation reads the full collection, changes it in memory, and
/// rewrites the file in one write. `write_lock` is held across the whole
/// read-modify-write cycle so interleaved mutations cannot lose updates.
/// Reads go straight to the file without the lock.
///
/// Ids are a monotonic counter persisted implicitly with the data: the next
/// id is `max(existing) + 1`, computed under the lock.
pub struct RecordStore<T: Record> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<T>,
}

impl<T: Record> RecordStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order.
    pub fn list(&self) -> Result<Vec<T>> {
        self.load()
    }

    pub fn get(&self, id: u64) -> Result<T> {
        self.load()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| self.not_found(id))
    }

    /// Assigns the next id, appends the record, and persists the collection.
    /// Returns the record as stored.
    pub fn insert(&self, mut record: T) -> Result<T> {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let next_id = records.iter().map(Record::id).max().unwrap_or(0) + 1;
        record.set_id(next_id);
        records.push(record.clone());
        self.persist(&records)?;
        debug!(id = next_id, path = %self.path.display(), "record inserted");
        Ok(record)
    }

    /// Applies `mutate` to the record and persists. Nothing is written if
    /// the mutator returns an error.
    pub fn update<F>(&self, id: u64, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        mutate(record)?;
        let updated = record.clone();
        self.persist(&records)?;
        debug!(id, path = %self.path.display(), "record updated");
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(self.not_found(id));
        }
        self.persist(&records)?;
        debug!(id, path = %self.path.display(), "record deleted");
        Ok(())
    }

    /// Removes every record matching the predicate and returns them.
    /// Matching nothing is not an error.
    pub fn delete_where<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let _guard = self.write_lock.lock();
        let records = self.load()?;
        let (removed, kept): (Vec<T>, Vec<T>) = records.into_iter().partition(|r| predicate(r));
        if !removed.is_empty() {
            self.persist(&kept)?;
        }
        Ok(removed)
    }

    fn load(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write-then-rename: readers skip the lock, so the collection file
    /// must never be observable half-written. The temp name is fixed per
    /// store; writers are already serialized by `write_lock`.
    fn persist(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn not_found(&self, id: u64) -> InnkeepError {
        let collection = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("collection");
        InnkeepError::NotFound(format!("no record {} in {}", id, collection))
    }
}
