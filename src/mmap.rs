//! Memory-mapped database files.
//!
//! This module provides read-only access to a memory-mapped database file.
//! Reads are plain memory copies out of the mapped region, so a lookup issues
//! no syscalls once the pages are resident.
//!
//! # Safety
//!
//! While memory-mapped files are inherently unsafe (file contents can change),
//! this module provides a safe API by:
//! - Never handing out pointers into the mapping
//! - Bounds-checking every read against the mapped length
//!
//! # Example
//!
//! ```no_run
//! use ipsrvdb::mmap::MmapSource;
//! use ipsrvdb::source::ReadAt;
//!
//! let mmap = MmapSource::open("ipsrv.dat")?;
//! println!("Size: {} bytes", mmap.len());
//! # Ok::<(), ipsrvdb::IpsrvError>(())
//! ```

use crate::error::{IpsrvError, Result};
use crate::source::{read_from_slice, ReadAt};
use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// A memory-mapped database file.
///
/// The file is unmapped when the `MmapSource` is dropped.
///
/// # Thread Safety
///
/// `MmapSource` is `Send + Sync`; concurrent reads only copy out of the
/// read-only mapping.
pub struct MmapSource {
    /// The memory-mapped file
    mmap: Mmap,
}

impl MmapSource {
    /// Open and memory-map a database file.
    ///
    /// # Errors
    ///
    /// Returns [`IpsrvError::Io`] if the file cannot be opened and
    /// [`IpsrvError::Mmap`] if the mapping fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IpsrvError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
        // SAFETY: the mapping is read-only and every access is bounds-checked
        // against its length. Concurrent truncation of the file by another
        // process is outside what a reader can defend against.
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| IpsrvError::Mmap(format!("Failed to mmap {}: {}", path.display(), e)))?;

        Ok(MmapSource { mmap })
    }
}

impl ReadAt for MmapSource {
    #[inline]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        Ok(read_from_slice(&self.mmap, buf, offset))
    }

    fn len(&self) -> u64 {
        self.mmap.len() as u64
    }
}

impl fmt::Debug for MmapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MmapSource")
            .field("size", &self.mmap.len())
            .finish()
    }
}
