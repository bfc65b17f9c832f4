//! Database handle
//!
//! A [`Database`] owns one backend and the layout parsed from it. It is only
//! ever constructed by a successful open, never changes afterwards, and is
//! `Send + Sync`, so one handle can serve lookups from many threads.
//!
//! # Examples
//!
//! ```no_run
//! use ipsrvdb::{AccessMode, Database};
//!
//! let db = Database::open("ipsrv.dat", AccessMode::Mapped)?;
//!
//! if let Some(record) = db.find("8.8.8.255")? {
//!     println!("{}", record);
//! }
//! for (column, value) in db.find_fields("8.8.8.255")? {
//!     println!("{} = {}", column, value);
//! }
//! println!("{} {} {}", db.header(), db.date(), db.description());
//! db.close();
//! # Ok::<(), ipsrvdb::IpsrvError>(())
//! ```

use crate::comparator::RangeKey;
use crate::endian::IndexRecord;
use crate::error::Result;
use crate::fields::{map_fields, FieldLookup};
use crate::layout::Layout;
use crate::search::SearchEngine;
use crate::source::{AccessMode, MemorySource, ReadAt, Source};
use crate::validation::{self, ValidationReport};
use serde::Serialize;
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Serializable summary of an opened database.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    /// Backend in use
    pub mode: AccessMode,
    /// Number of index records
    pub index_count: u64,
    /// Data section size in bytes
    pub data_size: u64,
    /// Column-header string size in bytes
    pub header_size: u32,
    /// Total file length in bytes
    pub file_size: u64,
    /// Column names in order
    pub columns: Vec<String>,
    /// Build date
    pub date: String,
    /// Free-text description
    pub description: String,
}

/// An opened, read-only range database.
#[derive(Debug)]
pub struct Database {
    source: Source,
    layout: Layout,
}

impl Database {
    /// Open `path` with the chosen backend and parse its layout.
    ///
    /// Either everything succeeds or an error is returned; there is no
    /// partially initialized handle.
    pub fn open<P: AsRef<Path>>(path: P, mode: AccessMode) -> Result<Self> {
        let path = path.as_ref();
        let source = Source::open(path, mode)?;
        let db = Self::from_source(source)?;
        debug!(path = %path.display(), %mode, records = db.layout.index_count, "opened database");
        Ok(db)
    }

    /// Open `path` memory-mapped.
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, AccessMode::Mapped)
    }

    /// Create a database over bytes already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_source(Source::Memory(MemorySource::from_bytes(data)))
    }

    fn from_source(source: Source) -> Result<Self> {
        let layout = Layout::parse(&source)?;
        Ok(Self { source, layout })
    }

    /// Release the backend resource.
    ///
    /// Consuming the handle guarantees no lookup can still be borrowing it.
    pub fn close(self) {
        debug!(mode = %self.source.mode(), "closing database");
        drop(self);
    }

    fn engine(&self) -> SearchEngine<'_, Source> {
        SearchEngine::new(&self.source, &self.layout)
    }

    /// Payload of the range containing `address`.
    ///
    /// Returns `Ok(None)` when no range contains the address. A matched
    /// record with an empty payload is `Ok(Some(""))`.
    ///
    /// # Errors
    ///
    /// [`IpsrvError::MalformedAddress`](crate::IpsrvError::MalformedAddress) if
    /// `address` is not an IPv4/IPv6 literal, or a read/format error from the
    /// backend.
    pub fn find(&self, address: &str) -> Result<Option<String>> {
        let key = RangeKey::parse(address)?;
        self.engine().find(&key)
    }

    /// Payload of the range containing an already-parsed address.
    pub fn find_ip(&self, addr: IpAddr) -> Result<Option<String>> {
        self.engine().find(&RangeKey::from(addr))
    }

    /// Payload zipped against the header columns.
    ///
    /// Returns an empty map when nothing matches or when the payload's field
    /// count differs from the header's. Use [`lookup_fields`](Self::lookup_fields)
    /// to tell those cases apart.
    pub fn find_fields(&self, address: &str) -> Result<HashMap<String, String>> {
        Ok(self.lookup_fields(address)?.into_map())
    }

    /// Field lookup that reports no-match and column mismatches explicitly.
    pub fn lookup_fields(&self, address: &str) -> Result<FieldLookup> {
        let Some(payload) = self.find(address)? else {
            return Ok(FieldLookup::NotFound);
        };
        let lookup = map_fields(&self.layout.header, &payload);
        if let FieldLookup::ColumnMismatch { columns, values } = lookup {
            warn!(address, columns, values, "payload does not match header columns");
        }
        Ok(lookup)
    }

    /// Comma-separated column names.
    pub fn header(&self) -> &str {
        &self.layout.header
    }

    /// Column names in header order.
    pub fn columns(&self) -> Vec<&str> {
        self.layout.columns().collect()
    }

    /// 8-byte build date.
    pub fn date(&self) -> &str {
        &self.layout.date
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.layout.description
    }

    /// Parsed section layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Backend in use.
    pub fn mode(&self) -> AccessMode {
        self.source.mode()
    }

    /// File length in bytes.
    pub fn len(&self) -> u64 {
        self.source.len()
    }

    /// True for a zero-length source (never the case for an opened file).
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Number of index records.
    pub fn record_count(&self) -> u64 {
        self.layout.index_count
    }

    /// Decode index record `i`.
    pub fn record(&self, i: u64) -> Result<IndexRecord> {
        self.engine().record(i)
    }

    /// Payload text of index record `i`.
    pub fn record_payload(&self, i: u64) -> Result<String> {
        let engine = self.engine();
        let record = engine.record(i)?;
        engine.payload(&record)
    }

    /// Serializable summary of the database.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            mode: self.mode(),
            index_count: self.layout.index_count,
            data_size: self.layout.data_size,
            header_size: self.layout.header_size,
            file_size: self.layout.file_len,
            columns: self.layout.columns().map(str::to_string).collect(),
            date: self.layout.date.clone(),
            description: self.layout.description.clone(),
        }
    }

    /// Check every record for ordering and bounds problems.
    pub fn validate(&self) -> ValidationReport {
        validation::validate(&self.source, &self.layout)
    }
}

/// Fluent opener: `Database::from(path).mode(AccessMode::File).open()`.
#[derive(Debug, Clone)]
pub struct DatabaseOpener {
    path: PathBuf,
    mode: AccessMode,
}

impl DatabaseOpener {
    /// Choose the backend.
    pub fn mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// Choose the backend by name (`mmap`, `file`, `memory`).
    pub fn mode_str(mut self, mode: &str) -> Result<Self> {
        self.mode = mode.parse()?;
        Ok(self)
    }

    /// Open the database.
    pub fn open(self) -> Result<Database> {
        Database::open(&self.path, self.mode)
    }
}

impl Database {
    /// Start a fluent open of `path` (memory-mapped unless changed).
    #[allow(clippy::should_implement_trait)]
    pub fn from<P: Into<PathBuf>>(path: P) -> DatabaseOpener {
        DatabaseOpener {
            path: path.into(),
            mode: AccessMode::default(),
        }
    }
}
