//! Synthetic database writer shared by the integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::net::IpAddr;
use tempfile::NamedTempFile;

/// One range: start address and payload.
pub struct Entry {
    pub key: [u8; 16],
    pub payload: String,
}

impl Entry {
    pub fn new(addr: &str, payload: &str) -> Self {
        let key = match addr.parse::<IpAddr>().unwrap() {
            IpAddr::V4(v4) => {
                let mut key = [0u8; 16];
                key[12..].copy_from_slice(&v4.octets());
                key
            }
            IpAddr::V6(v6) => v6.octets(),
        };
        Entry {
            key,
            payload: payload.to_string(),
        }
    }

    pub fn from_u128(key: u128, payload: &str) -> Self {
        Entry {
            key: key.to_be_bytes(),
            payload: payload.to_string(),
        }
    }
}

/// Serialize entries (already sorted) into the on-disk layout.
pub fn build_db(entries: &[Entry], header: &str, date: &str, description: &str) -> Vec<u8> {
    assert_eq!(date.len(), 8, "date must be 8 bytes");

    let mut index = Vec::with_capacity(entries.len() * 24);
    let mut data = Vec::new();
    for entry in entries {
        index.extend_from_slice(&entry.key);
        index.extend_from_slice(&(data.len() as i32).to_le_bytes());
        index.extend_from_slice(&(entry.payload.len() as i32).to_le_bytes());
        data.extend_from_slice(entry.payload.as_bytes());
    }

    let mut buf = Vec::new();
    buf.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    buf.extend_from_slice(&(data.len() as u64).to_le_bytes());
    buf.extend_from_slice(&(header.len() as u16).to_le_bytes());
    buf.extend_from_slice(&index);
    buf.extend_from_slice(&data);
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(date.as_bytes());
    buf.extend_from_slice(description.as_bytes());
    buf
}

/// Write bytes to a temp file that lives as long as the returned handle.
pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// The two-record IPv4 database: 0.0.0.0 -> "A,1", 8.8.8.0 -> "B,2".
pub fn scenario_db() -> Vec<u8> {
    build_db(
        &[Entry::new("0.0.0.0", "A,1"), Entry::new("8.8.8.0", "B,2")],
        "name,val",
        "20240101",
        "Scenario database",
    )
}
