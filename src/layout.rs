//! Section boundaries derived from the fixed header
//!
//! ```text
//! 0            18                 index_end          data_end    header_end   +8        EOF
//! ┌────────────┬──────────────────┬──────────────────┬───────────┬──────────┬─────────────┐
//! │ fixed hdr  │ index records    │ data section     │ columns   │ date     │ description │
//! │ 18 bytes   │ index_count × 24 │ data_size bytes  │ hdr_size  │ 8 bytes  │ remainder   │
//! └────────────┴──────────────────┴──────────────────┴───────────┴──────────┴─────────────┘
//! ```
//!
//! Parsing is all-or-nothing: every boundary is checked against the file
//! length before any text field is read, and a failure leaves nothing behind.

use crate::endian::{FixedHeader, DATE_SIZE, FIXED_HEADER_SIZE, INDEX_RECORD_SIZE};
use crate::error::{IpsrvError, Result};
use crate::source::ReadAt;
use serde::Serialize;
use tracing::debug;

/// Derived layout of an opened database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Number of index records
    pub index_count: u64,
    /// Data section size in bytes
    pub data_size: u64,
    /// Column-header string size in bytes
    pub header_size: u32,
    /// End of the index section, which is also the start of the data section
    pub index_end: u64,
    /// End of the data section
    pub data_end: u64,
    /// End of the column-header string
    pub header_end: u64,
    /// Total file length
    pub file_len: u64,
    /// Comma-separated column names
    pub header: String,
    /// 8-byte build date
    pub date: String,
    /// Free-text description
    pub description: String,
}

fn section_overflow(what: &str) -> IpsrvError {
    IpsrvError::Format(format!("{} offset overflows", what))
}

fn read_text<R: ReadAt + ?Sized>(source: &R, offset: u64, len: u64) -> Result<String> {
    let len = usize::try_from(len)
        .map_err(|_| IpsrvError::Format(format!("text field of {} bytes too large", len)))?;
    let bytes = source.read_vec_at(offset, len)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Layout {
    /// Read the fixed header and every metadata string from `source`.
    ///
    /// # Errors
    ///
    /// - [`IpsrvError::ShortRead`] if the file is shorter than the fixed header
    /// - [`IpsrvError::Format`] if the declared sections overflow or extend
    ///   past the end of the file
    pub fn parse<R: ReadAt + ?Sized>(source: &R) -> Result<Self> {
        let file_len = source.len();

        let mut prefix = [0u8; FIXED_HEADER_SIZE];
        source.read_exact_at(&mut prefix, 0)?;
        let fixed = FixedHeader::decode(&prefix)?;

        let index_end = fixed
            .index_count
            .checked_mul(INDEX_RECORD_SIZE as u64)
            .and_then(|n| n.checked_add(FIXED_HEADER_SIZE as u64))
            .ok_or_else(|| section_overflow("index"))?;
        let data_end = index_end
            .checked_add(fixed.data_size)
            .ok_or_else(|| section_overflow("data"))?;
        let header_end = data_end
            .checked_add(fixed.header_size as u64)
            .ok_or_else(|| section_overflow("header"))?;
        let date_end = header_end
            .checked_add(DATE_SIZE as u64)
            .ok_or_else(|| section_overflow("date"))?;

        if date_end > file_len {
            return Err(IpsrvError::Format(format!(
                "file truncated: sections need {} bytes before the description, file has {}",
                date_end, file_len
            )));
        }

        let header = read_text(source, data_end, fixed.header_size as u64)?;
        let date = read_text(source, header_end, DATE_SIZE as u64)?;
        let description = read_text(source, date_end, file_len - date_end)?;

        debug!(
            index_count = fixed.index_count,
            data_size = fixed.data_size,
            header_size = fixed.header_size,
            file_len,
            date = %date,
            "parsed database layout"
        );

        Ok(Layout {
            index_count: fixed.index_count,
            data_size: fixed.data_size,
            header_size: fixed.header_size,
            index_end,
            data_end,
            header_end,
            file_len,
            header,
            date,
            description,
        })
    }

    /// Absolute file offset of index record `i`.
    #[inline]
    pub fn record_offset(&self, i: u64) -> u64 {
        FIXED_HEADER_SIZE as u64 + i * INDEX_RECORD_SIZE as u64
    }

    /// Absolute file offset of the data section.
    #[inline]
    pub fn data_start(&self) -> u64 {
        self.index_end
    }

    /// Column names in header order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.header.split(',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    /// One record, data "A,1", header "name,val", date, description.
    fn sample_file() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&3u64.to_le_bytes());
        buf.extend_from_slice(&8u16.to_le_bytes());
        buf.extend_from_slice(&[0u8; 16]);
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&3i32.to_le_bytes());
        buf.extend_from_slice(b"A,1");
        buf.extend_from_slice(b"name,val");
        buf.extend_from_slice(b"20240115");
        buf.extend_from_slice(b"sample database");
        buf
    }

    #[test]
    fn test_parse_offsets() {
        let source = MemorySource::from_bytes(sample_file());
        let layout = Layout::parse(&source).unwrap();

        assert_eq!(layout.index_count, 1);
        assert_eq!(layout.data_size, 3);
        assert_eq!(layout.header_size, 8);
        assert_eq!(layout.index_end, 42);
        assert_eq!(layout.data_start(), 42);
        assert_eq!(layout.data_end, 45);
        assert_eq!(layout.header_end, 53);
        assert_eq!(layout.file_len, 76);
        assert_eq!(layout.header, "name,val");
        assert_eq!(layout.date, "20240115");
        assert_eq!(layout.description, "sample database");
        assert_eq!(layout.columns().collect::<Vec<_>>(), vec!["name", "val"]);
        assert_eq!(layout.record_offset(0), 18);
        assert_eq!(layout.record_offset(2), 66);
    }

    #[test]
    fn test_empty_description() {
        let mut file = sample_file();
        file.truncate(file.len() - "sample database".len());
        let layout = Layout::parse(&MemorySource::from_bytes(file)).unwrap();
        assert_eq!(layout.description, "");
    }

    #[test]
    fn test_too_short_for_fixed_header() {
        let source = MemorySource::from_bytes(vec![0u8; 10]);
        assert!(matches!(
            Layout::parse(&source),
            Err(IpsrvError::ShortRead { offset: 0, requested: 18, available: 10 })
        ));
    }

    #[test]
    fn test_truncated_date() {
        let mut file = sample_file();
        // Cut into the date string
        file.truncate(56);
        assert!(matches!(
            Layout::parse(&MemorySource::from_bytes(file)),
            Err(IpsrvError::Format(_))
        ));
    }

    #[test]
    fn test_overflowing_index_count() {
        let mut file = sample_file();
        file[0..8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            Layout::parse(&MemorySource::from_bytes(file)),
            Err(IpsrvError::Format(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut file = sample_file();
        let desc_start = file.len() - "sample database".len();
        file[desc_start] = 0xFF;
        let layout = Layout::parse(&MemorySource::from_bytes(file)).unwrap();
        assert!(layout.description.starts_with('\u{FFFD}'));
    }
}
