//! Random-access byte sources
//!
//! Every lookup reads the database through the [`ReadAt`] trait, so the layout
//! parser and the search never know which backend they are talking to. Three
//! backends exist:
//!
//! - [`AccessMode::Mapped`]: memory-mapped view ([`MmapSource`])
//! - [`AccessMode::File`]: positioned reads on an open file ([`FileSource`])
//! - [`AccessMode::Memory`]: the whole file in one owned buffer ([`MemorySource`])
//!
//! All of them return identical bytes for identical offsets, and all of them
//! report a read that runs past the end of the file as
//! [`IpsrvError::ShortRead`] when accessed through [`ReadAt::read_exact_at`].
//!
//! # Example
//!
//! ```no_run
//! use ipsrvdb::source::{AccessMode, ReadAt, Source};
//!
//! let source = Source::open("ipsrv.dat", AccessMode::File)?;
//! let mut prefix = [0u8; 18];
//! source.read_exact_at(&mut prefix, 0)?;
//! println!("{} bytes total", source.len());
//! # Ok::<(), ipsrvdb::IpsrvError>(())
//! ```

use crate::error::{IpsrvError, Result};
use crate::file_reader::{self, FileSource};
use crate::mmap::MmapSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Read-at-offset access to an immutable byte source.
///
/// Implementations must be safe to call from several threads at once; none of
/// them keep a shared cursor.
pub trait ReadAt {
    /// Copy bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied, which is less than `buf.len()` only
    /// when the source ends first.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    /// True if the source holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fill `buf` completely or fail with [`IpsrvError::ShortRead`].
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        let n = self.read_at(buf, offset)?;
        if n < buf.len() {
            return Err(IpsrvError::ShortRead {
                offset,
                requested: buf.len(),
                available: n,
            });
        }
        Ok(())
    }

    /// Read `len` bytes at `offset` into a new vector.
    fn read_vec_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact_at(&mut buf, offset)?;
        Ok(buf)
    }
}

/// Copy from an in-memory slice the way every slice-backed source does.
#[inline]
pub(crate) fn read_from_slice(data: &[u8], buf: &mut [u8], offset: u64) -> usize {
    let start = match usize::try_from(offset) {
        Ok(start) if start < data.len() => start,
        _ => return 0,
    };
    let n = buf.len().min(data.len() - start);
    buf[..n].copy_from_slice(&data[start..start + n]);
    n
}

/// Backend selection for [`Source::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Memory-mapped file
    #[default]
    #[serde(alias = "mmap")]
    Mapped,
    /// Positioned reads on an open file
    File,
    /// Whole file loaded into memory at open time
    #[serde(alias = "mem")]
    Memory,
}

impl AccessMode {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Mapped => "mmap",
            AccessMode::File => "file",
            AccessMode::Memory => "memory",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = IpsrvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mmap" | "mapped" => Ok(AccessMode::Mapped),
            "file" => Ok(AccessMode::File),
            "memory" | "mem" => Ok(AccessMode::Memory),
            _ => Err(IpsrvError::UnknownMode(s.to_string())),
        }
    }
}

/// Database bytes held entirely in memory.
pub struct MemorySource {
    buf: Vec<u8>,
}

impl MemorySource {
    /// Load a whole file, gunzipping it first when the name ends in `.gz`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buf = file_reader::read_all(path.as_ref())?;
        Ok(Self { buf })
    }

    /// Wrap bytes the caller already holds.
    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    /// The loaded bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl ReadAt for MemorySource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        Ok(read_from_slice(&self.buf, buf, offset))
    }

    fn len(&self) -> u64 {
        self.buf.len() as u64
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("len", &self.buf.len())
            .finish()
    }
}

/// One of the three backends, chosen at open time.
#[derive(Debug)]
pub enum Source {
    /// Memory-mapped file
    Mapped(MmapSource),
    /// Positioned file reads
    File(FileSource),
    /// Owned buffer
    Memory(MemorySource),
}

impl Source {
    /// Acquire the backend resource for `path`.
    pub fn open<P: AsRef<Path>>(path: P, mode: AccessMode) -> Result<Self> {
        let path = path.as_ref();
        let source = match mode {
            AccessMode::Mapped => Source::Mapped(MmapSource::open(path)?),
            AccessMode::File => Source::File(FileSource::open(path)?),
            AccessMode::Memory => Source::Memory(MemorySource::open(path)?),
        };
        Ok(source)
    }

    /// Which backend this is.
    pub fn mode(&self) -> AccessMode {
        match self {
            Source::Mapped(_) => AccessMode::Mapped,
            Source::File(_) => AccessMode::File,
            Source::Memory(_) => AccessMode::Memory,
        }
    }
}

impl ReadAt for Source {
    #[inline]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        match self {
            Source::Mapped(s) => s.read_at(buf, offset),
            Source::File(s) => s.read_at(buf, offset),
            Source::Memory(s) => s.read_at(buf, offset),
        }
    }

    fn len(&self) -> u64 {
        match self {
            Source::Mapped(s) => s.len(),
            Source::File(s) => s.len(),
            Source::Memory(s) => s.len(),
        }
    }
}
