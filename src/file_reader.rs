//! File-backed reads: positioned reads on an open file, and whole-file loads
//! with automatic gzip decompression.
//!
//! [`FileSource`] keeps the file open and serves every read with a positioned
//! read (`pread` on Unix, `seek_read` on Windows), so it has no cursor to share
//! between threads and no mapping size limit.
//!
//! [`read_all`] backs the in-memory mode. Files ending in `.gz`
//! (case-insensitive) are decompressed on the way in.
//!
//! # Example
//!
//! ```rust,no_run
//! use ipsrvdb::file_reader::FileSource;
//! use ipsrvdb::source::ReadAt;
//!
//! let file = FileSource::open("ipsrv.dat")?;
//! let mut counts = [0u8; 16];
//! file.read_exact_at(&mut counts, 0)?;
//! # Ok::<(), ipsrvdb::IpsrvError>(())
//! ```

use crate::error::{IpsrvError, Result};
use crate::source::ReadAt;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Buffer size for whole-file loads (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// An open database file read with positioned reads.
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    /// Open `path` and record its length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IpsrvError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
        let len = file
            .metadata()
            .map_err(|e| IpsrvError::Io(format!("Failed to stat {}: {}", path.display(), e)))?
            .len();
        Ok(Self { file, len })
    }
}

#[cfg(unix)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn pread(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

impl ReadAt for FileSource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        // A single pread may return fewer bytes than asked for before EOF
        let mut filled = 0;
        while filled < buf.len() {
            match pread(&self.file, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn len(&self) -> u64 {
        self.len
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Read a whole file into memory, gunzipping `.gz` files.
///
/// # Errors
///
/// Returns an error if:
/// - The file doesn't exist
/// - Permission denied
/// - Invalid gzip data (for .gz files)
pub fn read_all(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| IpsrvError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut buf = Vec::new();
    if is_gzip(path) {
        let mut decoder = GzDecoder::new(BufReader::with_capacity(BUFFER_SIZE, file));
        decoder.read_to_end(&mut buf).map_err(|e| {
            IpsrvError::Io(format!("Failed to decompress {}: {}", path.display(), e))
        })?;
    } else {
        // Size hint avoids regrowing for large databases
        if let Ok(meta) = file.metadata() {
            buf.reserve(meta.len() as usize);
        }
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
        reader
            .read_to_end(&mut buf)
            .map_err(|e| IpsrvError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    }
    Ok(buf)
}
