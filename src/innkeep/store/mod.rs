//! # Storage Layer
//!
//! Three storage engines, each exclusively owning its files:
//!
//! - [`records::RecordStore`]: a homogeneous collection persisted as one
//!   JSON-array file, rewritten whole on every mutation. Used for listings,
//!   maps, and bookings.
//! - [`log::AppendLogStore`]: one newline-delimited-JSON file per key, only
//!   ever appended to, reordered newest-first at read time. Used for reviews.
//! - [`blobs::BlobStore`]: uploaded byte streams stored under generated
//!   unique names. Used for listing images and map PDFs.
//!
//! ## Consistency model
//!
//! A record mutation is read-modify-write over the whole file. Without
//! serialization, two interleaved mutations would silently lose one of the
//! writes, so `RecordStore` holds a per-store mutex for the full cycle.
//! Reads skip the lock and may return a snapshot one write stale; id
//! uniqueness is enforced at write time, where the lock is held.
//!
//! Log appends never rewrite existing lines; a single serialized write per
//! entry is enough. There are no cross-file transactions — the one place
//! two files must move together (blob + catalog record) is handled by
//! compensation in the API layer, not here.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

pub mod blobs;
pub mod log;
pub mod records;

pub use blobs::{BlobStore, StoredBlob, UploadPolicy};
pub use log::AppendLogStore;
pub use records::RecordStore;

/// A record that can live in a [`RecordStore`] collection.
///
/// Ids are assigned by the store on insert; whatever id the caller set is
/// overwritten.
pub trait Record: Serialize + DeserializeOwned + Clone + Send {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

/// An entry that can live in an [`AppendLogStore`] log.
pub trait LogEntry: Serialize + DeserializeOwned + Clone + Send {
    fn created_at(&self) -> DateTime<Utc>;

    /// Called once by the store, just before the entry is written.
    fn assign(&mut self, id: Uuid, created_at: DateTime<Utc>);
}
