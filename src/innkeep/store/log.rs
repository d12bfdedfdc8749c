use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::LogEntry;
use crate::error::Result;

/// Per-key append-only log, one JSON record per line.
///
/// Existing lines are never rewritten, so appends need no read phase; a
/// single serialized write per entry keeps concurrent appends safe. Entries
/// are reordered newest-first at read time, not at write time.
pub struct AppendLogStore<T: LogEntry> {
    dir: PathBuf,
    file_prefix: String,
    file_suffix: String,
    append_lock: Mutex<()>,
    _entry: PhantomData<T>,
}

impl<T: LogEntry> AppendLogStore<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_prefix: "log_".to_string(),
            file_suffix: ".ndjson".to_string(),
            append_lock: Mutex::new(()),
            _entry: PhantomData,
        }
    }

    /// Overrides how log files are named: `{prefix}{key}{suffix}`.
    pub fn with_naming(mut self, prefix: &str, suffix: &str) -> Self {
        self.file_prefix = prefix.to_string();
        self.file_suffix = suffix.to_string();
        self
    }

    pub fn log_path(&self, key: u64) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", self.file_prefix, key, self.file_suffix))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stamps the entry with a fresh id and timestamp, serializes it as one
    /// line, and appends it to the key's log file. Returns the entry as
    /// written.
    pub fn append(&self, key: u64, mut entry: T) -> Result<T> {
        entry.assign(Uuid::new_v4(), Utc::now());
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.append_lock.lock();
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(key))?;
        file.write_all(line.as_bytes())?;
        debug!(key, path = %self.log_path(key).display(), "log entry appended");
        Ok(entry)
    }

    /// All entries for the key, newest first. A missing log file yields an
    /// empty list. Lines that fail to parse (a torn write at the tail, a
    /// stray edit) are skipped so one bad line cannot poison the whole log.
    pub fn read_all(&self, key: u64) -> Result<Vec<T>> {
        let path = self.log_path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping malformed log line")
                }
            }
        }
        entries.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(entries)
    }
}
