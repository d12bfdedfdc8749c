use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{InnkeepError, Result};

/// Extension allowlist and size cap for one kind of upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_size: u64,
}

impl UploadPolicy {
    pub fn new(extensions: &[&str], max_size: u64) -> Self {
        Self {
            allowed_extensions: extensions.iter().map(|e| e.to_string()).collect(),
            max_size,
        }
    }

    /// Listing photos: common web image formats, 5 MiB.
    pub fn hotel_images() -> Self {
        Self::new(&["jpg", "jpeg", "png", "webp"], 5 * 1024 * 1024)
    }

    /// Offline maps: PDF only, 10 MiB.
    pub fn map_documents() -> Self {
        Self::new(&["pdf"], 10 * 1024 * 1024)
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    fn allows(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// What [`BlobStore::store`] hands back: the generated name (the key for
/// `open`/`delete`) and the byte count written.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub stored_name: String,
    pub size: u64,
}

/// Stores uploaded files under generated unique names in one directory.
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validates the upload against the policy and writes it under a
    /// generated name.
    pub fn store(
        &self,
        bytes: &[u8],
        original_name: &str,
        policy: &UploadPolicy,
    ) -> Result<StoredBlob> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                InnkeepError::InvalidInput(format!("file has no extension: {}", original_name))
            })?;
        if !policy.allows(ext) {
            return Err(InnkeepError::InvalidInput(format!(
                "file type .{} is not allowed",
                ext
            )));
        }
        if bytes.len() as u64 > policy.max_size {
            return Err(InnkeepError::InvalidInput(format!(
                "file exceeds the {} byte limit",
                policy.max_size
            )));
        }

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let stored_name = generate_name(original_name);
        fs::write(self.dir.join(&stored_name), bytes)?;
        debug!(name = %stored_name, size = bytes.len(), "blob stored");
        Ok(StoredBlob {
            stored_name,
            size: bytes.len() as u64,
        })
    }

    pub fn open(&self, stored_name: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(stored_name)?;
        if !path.exists() {
            return Err(InnkeepError::NotFound(format!("blob {}", stored_name)));
        }
        Ok(fs::read(path)?)
    }

    /// Removes the blob. A name that is already gone is not an error.
    pub fn delete(&self, stored_name: &str) -> Result<()> {
        let path = self.blob_path(stored_name)?;
        if path.exists() {
            fs::remove_file(path)?;
            debug!(name = %stored_name, "blob deleted");
        }
        Ok(())
    }

    /// Stored names come back from clients on download/delete, so anything
    /// that could escape the blob directory is rejected here.
    fn blob_path(&self, stored_name: &str) -> Result<PathBuf> {
        if stored_name.is_empty()
            || stored_name.contains(['/', '\\'])
            || stored_name.contains("..")
        {
            return Err(InnkeepError::InvalidInput(format!(
                "unsafe blob name: {}",
                stored_name
            )));
        }
        Ok(self.dir.join(stored_name))
    }
}

/// `{millis}-{random}-{sanitized original name}`. The random suffix keeps
/// two uploads within the same millisecond apart; sanitizing collapses
/// whitespace to `-`, lower-cases, and strips path separators and `..`
/// so the generated name always passes `blob_path` on the way back in.
fn generate_name(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::random();
    let mut sanitized = original_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .replace(['/', '\\'], "-");
    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }
    format!("{}-{}-{}", millis, suffix, sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn store_then_open_round_trips() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path().join("blobs"));

        let blob = store
            .store(b"pdf bytes", "Trail Map.pdf", &UploadPolicy::map_documents())
            .unwrap();
        assert_eq!(blob.size, 9);
        assert!(blob.stored_name.ends_with("trail-map.pdf"));

        let bytes = store.open(&blob.stored_name).unwrap();
        assert_eq!(bytes, b"pdf bytes");
    }

    #[test]
    fn rejects_disallowed_extension() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let err = store
            .store(b"x", "malware.exe", &UploadPolicy::hotel_images())
            .unwrap_err();
        assert!(matches!(err, InnkeepError::InvalidInput(_)));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        store
            .store(b"x", "photo.JPG", &UploadPolicy::hotel_images())
            .unwrap();
    }

    #[test]
    fn rejects_oversize_upload() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        let policy = UploadPolicy::hotel_images().with_max_size(4);

        let err = store.store(b"12345", "big.png", &policy).unwrap_err();
        assert!(matches!(err, InnkeepError::InvalidInput(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let blob = store
            .store(b"x", "a.png", &UploadPolicy::hotel_images())
            .unwrap();
        store.delete(&blob.stored_name).unwrap();
        store.delete(&blob.stored_name).unwrap();
        store.delete("never-existed.png").unwrap();
    }

    #[test]
    fn open_missing_blob_is_not_found() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        assert!(matches!(
            store.open("nope.pdf"),
            Err(InnkeepError::NotFound(_))
        ));
    }

    #[test]
    fn path_traversal_names_are_rejected() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        assert!(store.open("../../etc/passwd").is_err());
        assert!(store.delete("a/b.pdf").is_err());
        assert!(store.open("").is_err());
    }

    #[test]
    fn hostile_original_names_yield_usable_stored_names() {
        let dir = tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let blob = store
            .store(
                b"x",
                "../../sneaky map.pdf",
                &UploadPolicy::map_documents(),
            )
            .unwrap();
        assert!(!blob.stored_name.contains('/'));
        assert!(!blob.stored_name.contains('\\'));
        assert!(!blob.stored_name.contains(".."));

        // and the name works back through open/delete
        assert_eq!(store.open(&blob.stored_name).unwrap(), b"x");
        store.delete(&blob.stored_name).unwrap();
    }

    #[test]
    fn generated_names_do_not_collide_for_same_input() {
        let a = generate_name("map.pdf");
        let b = generate_name("map.pdf");
        assert_ne!(a, b);
    }
}
