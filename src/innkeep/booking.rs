//! Booking lifecycle rules, layered over the booking record collection.
//!
//! A booking starts `pending`, becomes `confirmed` when the payment step
//! completes, and from there moves through the transition table in
//! [`BookingStatus`]. Bookings are never deleted; cancellation is a status.

use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{InnkeepError, Result};
use crate::model::{Booking, BookingRequest, BookingStatus};
use crate::store::RecordStore;

/// What a freshly created booking hands back to the caller: the stored
/// record plus the URL the guest is sent to for payment.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub payment_url: String,
}

pub struct BookingService {
    store: RecordStore<Booking>,
}

impl BookingService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::new(path),
        }
    }

    pub fn list(&self) -> Result<Vec<Booking>> {
        self.store.list()
    }

    pub fn get(&self, id: u64) -> Result<Booking> {
        self.store.get(id)
    }

    /// Persists a pending booking and returns it with its payment URL.
    /// Field presence is validated upstream; the placeholder payment id is
    /// replaced when payment is confirmed.
    pub fn create(&self, request: BookingRequest) -> Result<BookingReceipt> {
        let booking = Booking {
            id: 0, // assigned by the store
            hotel_id: request.hotel_id,
            hotel_name: request.hotel_name,
            guest_name: request.guest_name,
            email: request.email,
            phone: request.phone,
            number_of_guests: request.number_of_guests,
            check_in: request.check_in,
            check_out: request.check_out,
            total_amount: request.total_amount,
            status: BookingStatus::Pending,
            payment_id: format!("UNPAID-{}", Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: None,
            paid_at: None,
        };
        let booking = self.store.insert(booking)?;
        let payment_url = format!(
            "/process-payment?bookingId={}&amount={}",
            booking.id, booking.total_amount
        );
        debug!(id = booking.id, hotel = booking.hotel_id, "booking created");
        Ok(BookingReceipt {
            booking,
            payment_url,
        })
    }

    /// Marks the booking confirmed with a fresh payment id and paid-at
    /// stamp.
    ///
    /// Confirming an already-confirmed booking re-stamps both fields, which
    /// is what the payment flow has always done; see DESIGN.md before
    /// changing it. Checked-in and terminal states reject confirmation.
    pub fn confirm_payment(&self, id: u64) -> Result<Booking> {
        self.store.update(id, |booking| match booking.status {
            BookingStatus::Pending | BookingStatus::Confirmed => {
                booking.status = BookingStatus::Confirmed;
                booking.payment_id = format!("PAY-{}", Uuid::new_v4());
                booking.paid_at = Some(Utc::now());
                Ok(())
            }
            from => Err(InnkeepError::InvalidTransition {
                from,
                to: BookingStatus::Confirmed,
            }),
        })
    }

    /// Moves the booking to `status` if the transition table allows it,
    /// stamping `updated_at`.
    pub fn set_status(&self, id: u64, status: BookingStatus) -> Result<Booking> {
        self.store.update(id, |booking| {
            if !booking.status.can_transition_to(status) {
                warn!(id, from = %booking.status, to = %status, "rejected status transition");
                return Err(InnkeepError::InvalidTransition {
                    from: booking.status,
                    to: status,
                });
            }
            booking.status = status;
            booking.updated_at = Some(Utc::now());
            Ok(())
        })
    }
}
