//! Binary search over the index section
//!
//! Index records are sorted by range-start key and each record covers the
//! addresses from its own key up to (not including) the next record's key. The
//! last record extends to the top of the address space. Resolving an address
//! therefore means finding the last record whose key is `<=` the query.
//!
//! Keys are decoded one record at a time through [`ReadAt`], so the search works
//! the same over a mapping, an open file or an in-memory buffer.

use crate::comparator::{compare, RangeKey};
use crate::endian::{IndexRecord, INDEX_RECORD_SIZE};
use crate::error::{IpsrvError, Result};
use crate::layout::Layout;
use crate::source::ReadAt;
use std::cmp::Ordering;
use tracing::trace;

/// Resolves addresses against one database's index and data sections.
pub struct SearchEngine<'a, R: ReadAt + ?Sized> {
    source: &'a R,
    layout: &'a Layout,
}

impl<'a, R: ReadAt + ?Sized> SearchEngine<'a, R> {
    /// Bind a search to an opened source and its parsed layout.
    pub fn new(source: &'a R, layout: &'a Layout) -> Self {
        Self { source, layout }
    }

    /// Decode index record `i`.
    pub fn record(&self, i: u64) -> Result<IndexRecord> {
        if i >= self.layout.index_count {
            return Err(IpsrvError::Format(format!(
                "record {} out of range ({} records)",
                i, self.layout.index_count
            )));
        }
        let mut buf = [0u8; INDEX_RECORD_SIZE];
        self.source
            .read_exact_at(&mut buf, self.layout.record_offset(i))?;
        IndexRecord::decode(&buf)
    }

    /// Index of the record whose range contains `query`, if any.
    ///
    /// Returns `None` when the query sorts below the first key or the index is
    /// empty. An exact range-start match returns immediately.
    pub fn locate(&self, query: &RangeKey) -> Result<Option<u64>> {
        // Invariant: key[i] <= query for i < start, key[i] > query for i >= end
        let mut start = 0u64;
        let mut end = self.layout.index_count;

        while start < end {
            let mid = start + (end - start) / 2;
            let record = self.record(mid)?;
            match compare(&record.key, query) {
                Ordering::Greater => end = mid,
                Ordering::Less => start = mid + 1,
                Ordering::Equal => return Ok(Some(mid)),
            }
        }

        Ok(start.checked_sub(1))
    }

    /// Raw payload bytes of `record`.
    ///
    /// # Errors
    ///
    /// [`IpsrvError::Format`] if the payload lies outside the data section.
    pub fn payload_bytes(&self, record: &IndexRecord) -> Result<Vec<u8>> {
        let range = record.payload_range()?;
        if range.end > self.layout.data_size {
            return Err(IpsrvError::Format(format!(
                "payload {}..{} exceeds data section of {} bytes",
                range.start, range.end, self.layout.data_size
            )));
        }
        // data_size <= file length, so the length fits in memory
        let len = (range.end - range.start) as usize;
        self.source
            .read_vec_at(self.layout.data_start() + range.start, len)
    }

    /// Payload of `record` as text.
    pub fn payload(&self, record: &IndexRecord) -> Result<String> {
        let bytes = self.payload_bytes(record)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Payload of the range containing `query`.
    ///
    /// `Ok(None)` means no range contains the query; `Ok(Some(""))` is a
    /// matched record with an empty payload.
    pub fn find(&self, query: &RangeKey) -> Result<Option<String>> {
        let Some(i) = self.locate(query)? else {
            trace!(?query, "no containing range");
            return Ok(None);
        };
        let record = self.record(i)?;
        trace!(?query, record = i, "resolved range");
        self.payload(&record).map(Some)
    }
}
