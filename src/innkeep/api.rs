//! # API Facade
//!
//! The single entry point for the HTTP collaborator. One method per logical
//! operation; every method takes decoded Rust values (the transport has
//! already parsed multipart bodies into bytes + metadata) and returns
//! `Result<T>` for the collaborator to serialize and map onto status codes:
//! `NotFound` → 404, `InvalidInput` → 400, `InvalidTransition` → 409,
//! anything else → 500.
//!
//! ## What the facade owns
//!
//! All stores. Each collection file and upload directory has exactly one
//! owning store, so a single `InnkeepApi` per process is the intended
//! shape — it is `Sync` and can be shared behind an `Arc`.
//!
//! ## Blob + record pairing
//!
//! Listing and map creation write two things: the uploaded blob and its
//! catalog record. There is no transaction spanning the two; instead the
//! blob is written first and deleted again if the record insert fails, so
//! a failed create never leaves an orphaned upload behind.

use chrono::Utc;
use tracing::warn;

use crate::booking::{BookingReceipt, BookingService};
use crate::config::{InnkeepConfig, InnkeepPaths};
use crate::error::{InnkeepError, Result};
use crate::model::{
    Booking, BookingRequest, BookingStatus, Listing, MapAsset, NewListing, NewMapAsset, NewReview,
    Review,
};
use crate::store::{AppendLogStore, BlobStore, RecordStore, UploadPolicy};

pub struct InnkeepApi {
    config: InnkeepConfig,
    listings: RecordStore<Listing>,
    maps: RecordStore<MapAsset>,
    bookings: BookingService,
    reviews: AppendLogStore<Review>,
    listing_images: BlobStore,
    map_files: BlobStore,
}

impl InnkeepApi {
    /// Opens the API over the given layout, loading `config.json` if
    /// present. Files and directories are created lazily on first write.
    pub fn open(paths: &InnkeepPaths) -> Result<Self> {
        let config = InnkeepConfig::load(paths.root())?;
        Ok(Self {
            listings: RecordStore::new(paths.listings_file()),
            maps: RecordStore::new(paths.maps_file()),
            bookings: BookingService::new(paths.bookings_file()),
            reviews: AppendLogStore::new(paths.reviews_dir())
                .with_naming("hotel_", "_reviews.ndjson"),
            listing_images: BlobStore::new(paths.hotel_uploads_dir()),
            map_files: BlobStore::new(paths.map_uploads_dir()),
            config,
        })
    }

    pub fn config(&self) -> &InnkeepConfig {
        &self.config
    }

    // -------------------------------------------------------------------
    // Listings
    // -------------------------------------------------------------------

    pub fn listings(&self) -> Result<Vec<Listing>> {
        self.listings.list()
    }

    /// Stores the uploaded image, then the listing record pointing at it.
    pub fn add_listing(
        &self,
        meta: NewListing,
        image: &[u8],
        original_name: &str,
    ) -> Result<Listing> {
        let policy = UploadPolicy::hotel_images().with_max_size(self.config.image_max_size);
        let blob = self.listing_images.store(image, original_name, &policy)?;

        let price = meta.normalized_price();
        let listing = Listing {
            id: 0,
            title: meta.title,
            description: meta.description,
            location: meta.location,
            price,
            image_path: format!("/uploads/hotels/{}", blob.stored_name),
        };
        match self.listings.insert(listing) {
            Ok(stored) => Ok(stored),
            Err(err) => {
                warn!(%err, blob = %blob.stored_name, "listing insert failed, removing uploaded image");
                let _ = self.listing_images.delete(&blob.stored_name);
                Err(err)
            }
        }
    }

    /// Removes the listing record, then best-effort removes its image.
    pub fn delete_listing(&self, id: u64) -> Result<()> {
        let listing = self.listings.get(id)?;
        self.listings.delete(id)?;
        if let Some(name) = listing.image_path.rsplit('/').next() {
            let _ = self.listing_images.delete(name);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Offline maps
    // -------------------------------------------------------------------

    pub fn maps(&self) -> Result<Vec<MapAsset>> {
        self.maps.list()
    }

    pub fn add_map(&self, meta: NewMapAsset, file: &[u8], original_name: &str) -> Result<MapAsset> {
        let policy = UploadPolicy::map_documents().with_max_size(self.config.map_max_size);
        let blob = self.map_files.store(file, original_name, &policy)?;

        let asset = MapAsset {
            id: 0,
            file_name: blob.stored_name.clone(),
            original_name: original_name.to_string(),
            name: meta.name,
            description: meta.description,
            upload_date: Utc::now(),
            size: blob.size,
            path: format!("/uploads/maps/{}", blob.stored_name),
        };
        match self.maps.insert(asset) {
            Ok(stored) => Ok(stored),
            Err(err) => {
                warn!(%err, blob = %blob.stored_name, "map insert failed, removing uploaded file");
                let _ = self.map_files.delete(&blob.stored_name);
                Err(err)
            }
        }
    }

    /// Removes the catalog entry and the file. Deleting a map that is
    /// already gone succeeds; the operation converges on "absent".
    pub fn delete_map(&self, file_name: &str) -> Result<()> {
        self.maps.delete_where(|m| m.file_name == file_name)?;
        self.map_files.delete(file_name)
    }

    pub fn download_map(&self, file_name: &str) -> Result<Vec<u8>> {
        self.map_files.open(file_name)
    }

    // -------------------------------------------------------------------
    // Bookings
    // -------------------------------------------------------------------

    pub fn bookings(&self) -> Result<Vec<Booking>> {
        self.bookings.list()
    }

    pub fn get_booking(&self, id: u64) -> Result<Booking> {
        self.bookings.get(id)
    }

    pub fn create_booking(&self, request: BookingRequest) -> Result<BookingReceipt> {
        self.bookings.create(request)
    }

    pub fn confirm_payment(&self, id: u64) -> Result<Booking> {
        self.bookings.confirm_payment(id)
    }

    pub fn set_booking_status(&self, id: u64, status: BookingStatus) -> Result<Booking> {
        self.bookings.set_status(id, status)
    }

    // -------------------------------------------------------------------
    // Reviews
    // -------------------------------------------------------------------

    /// Reviews for one hotel, newest first.
    pub fn reviews(&self, hotel_id: u64) -> Result<Vec<Review>> {
        self.reviews.read_all(hotel_id)
    }

    /// Appends a review. The hotel id is not checked against the listing
    /// collection; see DESIGN.md.
    pub fn add_review(&self, hotel_id: u64, review: NewReview) -> Result<Review> {
        if !(1..=5).contains(&review.rating) {
            return Err(InnkeepError::InvalidInput(format!(
                "rating must be between 1 and 5, got {}",
                review.rating
            )));
        }
        self.reviews.append(hotel_id, review.into_entry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn open_api(dir: &tempfile::TempDir) -> InnkeepApi {
        InnkeepApi::open(&InnkeepPaths::new(dir.path())).unwrap()
    }

    fn lodge() -> NewListing {
        NewListing {
            title: "Mountain Lodge".into(),
            description: "Cosy lodge below the pass".into(),
            location: "EBC".into(),
            price: "$50".into(),
        }
    }

    #[test]
    fn add_listing_stores_image_and_record() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        let listing = api.add_listing(lodge(), b"imagebytes", "Lodge Front.jpg").unwrap();
        assert_eq!(listing.id, 1);
        assert_eq!(listing.price, "50");
        assert!(listing.image_path.starts_with("/uploads/hotels/"));
        assert!(listing.image_path.ends_with("lodge-front.jpg"));

        // the blob landed where image_path points
        let name = listing.image_path.rsplit('/').next().unwrap();
        assert!(dir.path().join("uploads/hotels").join(name).exists());
    }

    #[test]
    fn delete_listing_removes_record_and_image() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        let listing = api.add_listing(lodge(), b"img", "front.png").unwrap();
        let name = listing.image_path.rsplit('/').next().unwrap().to_string();

        api.delete_listing(listing.id).unwrap();
        assert!(api.listings().unwrap().is_empty());
        assert!(!dir.path().join("uploads/hotels").join(&name).exists());

        assert!(matches!(
            api.delete_listing(listing.id),
            Err(InnkeepError::NotFound(_))
        ));
    }

    #[test]
    fn failed_listing_insert_removes_the_uploaded_image() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        // Make the collection file unwritable by occupying its path with a
        // directory, so the insert fails after the blob is stored.
        fs::create_dir_all(dir.path().join("data/listings.json")).unwrap();

        assert!(api.add_listing(lodge(), b"img", "front.png").is_err());
        let uploads: Vec<_> = fs::read_dir(dir.path().join("uploads/hotels"))
            .unwrap()
            .collect();
        assert!(uploads.is_empty());
    }

    #[test]
    fn map_upload_download_delete_cycle() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        let meta = NewMapAsset {
            name: "Annapurna Circuit".into(),
            description: "Full circuit, offline".into(),
        };
        let asset = api.add_map(meta, b"%PDF-1.4", "Circuit Map.pdf").unwrap();
        assert_eq!(asset.size, 8);
        assert!(asset.file_name.ends_with("circuit-map.pdf"));
        assert_eq!(asset.path, format!("/uploads/maps/{}", asset.file_name));

        let bytes = api.download_map(&asset.file_name).unwrap();
        assert_eq!(bytes, b"%PDF-1.4");

        api.delete_map(&asset.file_name).unwrap();
        assert!(api.maps().unwrap().is_empty());
        assert!(matches!(
            api.download_map(&asset.file_name),
            Err(InnkeepError::NotFound(_))
        ));

        // deleting again is fine
        api.delete_map(&asset.file_name).unwrap();
    }

    #[test]
    fn map_upload_rejects_non_pdf() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        let err = api
            .add_map(NewMapAsset::default(), b"x", "map.png")
            .unwrap_err();
        assert!(matches!(err, InnkeepError::InvalidInput(_)));
        assert!(api.maps().unwrap().is_empty());
    }

    #[test]
    fn review_rating_is_bounded() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        let review = NewReview {
            content: "Great stay".into(),
            rating: 6,
            user_id: "u1".into(),
            user_name: "Pemba".into(),
        };
        assert!(matches!(
            api.add_review(1, review),
            Err(InnkeepError::InvalidInput(_))
        ));
        assert!(api.reviews(1).unwrap().is_empty());
    }

    #[test]
    fn reviews_come_back_newest_first() {
        let dir = tempdir().unwrap();
        let api = open_api(&dir);

        let review = |content: &str| NewReview {
            content: content.into(),
            rating: 5,
            user_id: "u1".into(),
            user_name: "Pemba".into(),
        };
        api.add_review(1, review("Great stay")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        api.add_review(1, review("Even better the second time"))
            .unwrap();

        let reviews = api.reviews(1).unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].content, "Even better the second time");
        // reviews for another hotel stay empty
        assert!(api.reviews(2).unwrap().is_empty());
    }
}
