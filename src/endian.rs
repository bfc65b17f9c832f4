//! Fixed-width field decoding for the database file format
//!
//! The file mixes two integer conventions:
//!
//! - The 8-byte section counts at offsets 0 and 8 are little-endian unsigned.
//! - The 2-byte header size and the 4-byte offsets/lengths inside index records
//!   are "swapped" integers: the bytes are padded to 4 (two zero bytes appended
//!   for 2-byte fields), reversed, then read as a big-endian `i32`. The net
//!   result is a little-endian decode, and [`decode_swapped_i32`] reproduces the
//!   padding convention bit-for-bit.
//!
//! ```text
//! fixed header (18 bytes)
//! ┌────────────────┬────────────────┬──────────┐
//! │ index_count u64│ data_size  u64 │ hdr_size │
//! │  LE, 8 bytes   │  LE, 8 bytes   │ 2 bytes  │
//! └────────────────┴────────────────┴──────────┘
//!
//! index record (24 bytes)
//! ┌──────────────────────────────┬─────────┬─────────┐
//! │ range start key (16, BE u128)│ offset  │ length  │
//! └──────────────────────────────┴─────────┴─────────┘
//! ```
//!
//! All functions here are pure; nothing performs I/O.

use crate::error::{IpsrvError, Result};
use std::ops::Range;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of the fixed header at the start of every file
pub const FIXED_HEADER_SIZE: usize = 18;

/// Size of one index record
pub const INDEX_RECORD_SIZE: usize = 24;

/// Size of a range-start key
pub const KEY_SIZE: usize = 16;

/// Size of the build-date string that follows the column header
pub const DATE_SIZE: usize = 8;

/// Raw fixed header as it sits in the file.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RawFixedHeader {
    /// Number of index records (little-endian u64)
    pub index_count: [u8; 8],
    /// Size of the data section in bytes (little-endian u64)
    pub data_size: [u8; 8],
    /// Size of the column-header string (swapped 2-byte integer)
    pub header_size: [u8; 2],
}

/// Raw index record as it sits in the file.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RawIndexRecord {
    /// Range-start key, 128-bit big-endian
    pub key: [u8; KEY_SIZE],
    /// Payload offset into the data section (swapped 4-byte integer)
    pub data_offset: [u8; 4],
    /// Payload length (swapped 4-byte integer)
    pub data_length: [u8; 4],
}

/// Decode an 8-byte little-endian unsigned integer.
#[inline]
pub fn decode_u64_le(bytes: [u8; 8]) -> u64 {
    u64::from_le_bytes(bytes)
}

#[inline]
fn swapped_i32(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes([bytes[3], bytes[2], bytes[1], bytes[0]])
}

/// Decode a 2- or 4-byte swapped integer.
///
/// 2-byte input `[b0, b1]` becomes `[b0, b1, 0, 0]`; the four bytes are then
/// reversed and read as a big-endian `i32`.
///
/// # Errors
///
/// Returns [`IpsrvError::Format`] for any other input width.
pub fn decode_swapped_i32(bytes: &[u8]) -> Result<i32> {
    match *bytes {
        [b0, b1] => Ok(swapped_i32([b0, b1, 0, 0])),
        [b0, b1, b2, b3] => Ok(swapped_i32([b0, b1, b2, b3])),
        _ => Err(IpsrvError::Format(format!(
            "swapped integer must be 2 or 4 bytes, got {}",
            bytes.len()
        ))),
    }
}

/// Decoded fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    /// Number of index records
    pub index_count: u64,
    /// Data section size in bytes
    pub data_size: u64,
    /// Column-header string size in bytes
    pub header_size: u32,
}

impl FixedHeader {
    /// Decode the 18-byte prefix of a database file.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (raw, _) = RawFixedHeader::read_from_prefix(bytes).map_err(|_| {
            IpsrvError::Format(format!(
                "fixed header needs {} bytes, got {}",
                FIXED_HEADER_SIZE,
                bytes.len()
            ))
        })?;
        let [h0, h1] = raw.header_size;
        Ok(FixedHeader {
            index_count: decode_u64_le(raw.index_count),
            data_size: decode_u64_le(raw.data_size),
            // Two zero bytes of padding keep this non-negative
            header_size: swapped_i32([h0, h1, 0, 0]) as u32,
        })
    }
}

/// One decoded index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord {
    /// Range-start key
    pub key: [u8; KEY_SIZE],
    /// Payload offset into the data section
    pub data_offset: i32,
    /// Payload length in bytes
    pub data_length: i32,
}

impl IndexRecord {
    /// Split a 24-byte record into key `[0,16)`, offset `[16,20)` and length `[20,24)`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (raw, _) = RawIndexRecord::read_from_prefix(bytes).map_err(|_| {
            IpsrvError::Format(format!(
                "index record needs {} bytes, got {}",
                INDEX_RECORD_SIZE,
                bytes.len()
            ))
        })?;
        Ok(IndexRecord {
            key: raw.key,
            data_offset: swapped_i32(raw.data_offset),
            data_length: swapped_i32(raw.data_length),
        })
    }

    /// The key as a 128-bit unsigned integer.
    #[inline]
    pub fn key_u128(&self) -> u128 {
        u128::from_be_bytes(self.key)
    }

    /// Byte range of the payload relative to the start of the data section.
    ///
    /// # Errors
    ///
    /// Negative offsets or lengths are a [`IpsrvError::Format`] error.
    pub fn payload_range(&self) -> Result<Range<u64>> {
        if self.data_offset < 0 || self.data_length < 0 {
            return Err(IpsrvError::Format(format!(
                "negative payload bounds: offset {}, length {}",
                self.data_offset, self.data_length
            )));
        }
        let start = self.data_offset as u64;
        Ok(start..start + self.data_length as u64)
    }
}
