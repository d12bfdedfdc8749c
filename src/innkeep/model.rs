use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::InnkeepError;
use crate::store::{LogEntry, Record};

/// A hotel listing as shown on the site. Immutable once created; the only
/// mutation is deletion of the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Stored as a bare number string; currency symbols are stripped on create.
    pub price: String,
    pub image_path: String,
}

/// Metadata half of a listing upload. The image bytes travel separately.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: String,
}

impl NewListing {
    pub fn normalized_price(&self) -> String {
        self.price.chars().filter(|c| *c != '$' && *c != ',').collect()
    }
}

impl Record for Listing {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// An uploaded offline map (a PDF) plus its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAsset {
    pub id: u64,
    /// Generated name the blob is stored under; also the deletion key.
    pub file_name: String,
    pub original_name: String,
    pub name: String,
    pub description: String,
    pub upload_date: DateTime<Utc>,
    pub size: u64,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMapAsset {
    pub name: String,
    pub description: String,
}

impl Record for MapAsset {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// The closed set of states a booking can occupy.
///
/// Serialized in kebab-case (`"checked-in"`), which is also what the
/// status-update endpoint accepts via [`FromStr`]. Unknown strings are
/// rejected rather than stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    CheckedIn,
    CheckedOut,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::CheckedOut => "checked-out",
        }
    }

    /// The transition table for explicit status updates. Self-transitions
    /// are not listed and therefore rejected.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, CheckedIn)
                | (CheckedIn, CheckedOut)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = InnkeepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "checked-in" => Ok(BookingStatus::CheckedIn),
            "checked-out" => Ok(BookingStatus::CheckedOut),
            other => Err(InnkeepError::InvalidInput(format!(
                "unknown booking status: {}",
                other
            ))),
        }
    }
}

/// A guest's reservation. Never deleted; only its status moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: u64,
    pub hotel_id: u64,
    pub hotel_name: String,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub number_of_guests: u32,
    // Check-in/out dates pass through as entered on the booking form.
    pub check_in: String,
    pub check_out: String,
    pub total_amount: String,
    pub status: BookingStatus,
    pub payment_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Record for Booking {
    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// What the booking form submits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub hotel_id: u64,
    pub hotel_name: String,
    pub guest_name: String,
    pub email: String,
    pub phone: String,
    pub number_of_guests: u32,
    pub check_in: String,
    pub check_out: String,
    pub total_amount: String,
}

/// A guest review. Write-once; the hotel it belongs to is implicit in the
/// log file it is appended to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub content: String,
    pub rating: u8,
    pub user_id: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub content: String,
    pub rating: u8,
    pub user_id: String,
    pub user_name: String,
}

impl NewReview {
    /// Builds the log entry; id and timestamp are overwritten by the store
    /// when the entry is appended.
    pub fn into_entry(self) -> Review {
        Review {
            id: Uuid::nil(),
            content: self.content,
            rating: self.rating,
            user_id: self.user_id,
            user_name: self.user_name,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl LogEntry for Review {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn assign(&mut self, id: Uuid, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }
}
