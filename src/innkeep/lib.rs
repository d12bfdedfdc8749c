//! # Innkeep Architecture
//!
//! Innkeep is the **persistence and lifecycle core** of a hotel-booking
//! service. It is a library with no UI and no HTTP surface: the routing
//! layer lives elsewhere, decodes requests, and calls into [`api::InnkeepApi`].
//!
//! ## The layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  HTTP collaborator (out of tree)                            │
//! │  - Routing, auth, multipart decoding, status-code mapping   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Facade (api.rs)                                        │
//! │  - One method per logical operation                         │
//! │  - Owns every store; pairs blob writes with record writes   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain layer (booking.rs)                                  │
//! │  - Booking state machine and payment confirmation           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - RecordStore: one JSON-array file per collection          │
//! │  - AppendLogStore: per-key newline-delimited logs           │
//! │  - BlobStore: uploaded files under generated names          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions Beyond the Data Directory
//!
//! From `api.rs` inward, code:
//! - Takes regular Rust function arguments (decoded bytes, typed requests)
//! - Returns regular Rust types (`Result<T>`)
//! - **Never** writes to stdout/stderr
//! - **Never** assumes a transport; the same core could sit behind any server
//!
//! ## Concurrency
//!
//! Each collection file is owned by exactly one store instance. Record
//! mutations hold a per-store mutex across the whole read-modify-write
//! cycle, so two in-flight requests cannot lose each other's writes. Reads
//! go straight to the file and may observe a snapshot one write stale.
//! Review logs are append-only and serialized per store.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade—entry point for all operations
//! - [`booking`]: Booking lifecycle rules (status transitions, payment)
//! - [`store`]: Storage engines (records, append logs, blobs)
//! - [`model`]: Core data types (`Listing`, `MapAsset`, `Booking`, `Review`)
//! - [`config`]: Configuration and on-disk layout
//! - [`error`]: Error types

pub mod api;
pub mod booking;
pub mod config;
pub mod error;
pub mod model;
pub mod store;

pub use api::InnkeepApi;
pub use config::{InnkeepConfig, InnkeepPaths};
pub use error::{InnkeepError, Result};
