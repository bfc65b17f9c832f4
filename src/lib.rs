//! ipsrvdb - Reader for IP range databases
//!
//! An ipsrv database maps IPv4/IPv6 address ranges to comma-separated records
//! (country, city, ASN, ...). This crate opens such a file read-only and
//! resolves addresses to their records with a binary search over a sorted
//! index.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ipsrvdb::{AccessMode, Database};
//!
//! let db = Database::open("ipsrv.dat", AccessMode::Mapped)?;
//!
//! // Raw record
//! if let Some(record) = db.find("8.8.8.255")? {
//!     println!("{}", record);
//! }
//!
//! // Record zipped against the column header
//! let fields = db.find_fields("8.8.8.255")?;
//! println!("{:?}", fields);
//!
//! println!("{} / {} / {}", db.header(), db.date(), db.description());
//! # Ok::<(), ipsrvdb::IpsrvError>(())
//! ```
//!
//! # Backends
//!
//! | Mode | Backend | Notes |
//! |---|---|---|
//! | `mmap` | [`mmap::MmapSource`] | Zero-syscall reads, pages shared between processes |
//! | `file` | [`file_reader::FileSource`] | Positioned reads, no mapping size limits |
//! | `memory` | [`source::MemorySource`] | Whole file in RAM; `.gz` files are decompressed |
//!
//! # File Format
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  Fixed header (18 bytes)             │
//! │  Index: sorted 24-byte records       │
//! │  Data: comma-separated payloads      │
//! │  Column header, build date           │
//! │  Description (rest of file)          │
//! └──────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Range-key normalization and ordering
pub mod comparator;
/// Unified database API
pub mod database;
pub mod endian;
pub mod error;
pub mod fields;
pub mod file_reader;
pub mod layout;
pub mod mmap;
pub mod search;
pub mod source;
pub mod validation;

// Re-exports for Rust consumers

pub use crate::comparator::RangeKey;
pub use crate::database::{Database, DatabaseOpener, Metadata};
pub use crate::endian::IndexRecord;
pub use crate::error::{IpsrvError, Result};
pub use crate::fields::{FieldLookup, Fields};
pub use crate::layout::Layout;
pub use crate::source::{AccessMode, ReadAt};
pub use crate::validation::ValidationReport;

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
