//! Whole-database integrity checks
//!
//! Lookups only touch the records a binary search visits, so a damaged index
//! can go unnoticed for a long time. [`validate`] walks every record once and
//! reports:
//!
//! - **errors**: keys out of order, payloads outside the data section,
//!   unreadable records. Lookups can return wrong answers.
//! - **warnings**: duplicate keys, payloads whose field count differs from the
//!   header, a date that is not eight ASCII digits.
//! - **info**: address-family breakdown and sizes.

use crate::comparator::RangeKey;
use crate::layout::Layout;
use crate::search::SearchEngine;
use crate::source::ReadAt;
use serde::Serialize;
use tracing::debug;

/// Per-record messages of one kind are capped at this many
const MAX_RECORD_MESSAGES: usize = 20;

/// Validation report with detailed findings
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Problems that make lookups return wrong answers
    pub errors: Vec<String>,
    /// Potential issues (non-fatal)
    pub warnings: Vec<String>,
    /// Informational messages about database properties
    pub info: Vec<String>,
    /// Database statistics
    pub stats: DatabaseStats,
}

/// Database statistics gathered during validation
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStats {
    /// File size in bytes
    pub file_size: u64,
    /// Number of index records
    pub record_count: u64,
    /// Records whose key fits in the IPv4 range (high 96 bits zero)
    pub ipv4_ranges: u64,
    /// Records keyed above the IPv4 range
    pub ipv6_ranges: u64,
    /// Number of header columns
    pub column_count: usize,
    /// Data section size in bytes
    pub data_size: u64,
    /// Records whose field count differs from the header
    pub column_mismatches: u64,
    /// Records sharing a key with their predecessor
    pub duplicate_keys: u64,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            stats: DatabaseStats::default(),
        }
    }

    /// Check if database passed all validations (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn info(&mut self, msg: impl Into<String>) {
        self.info.push(msg.into());
    }
}

impl DatabaseStats {
    /// Human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Records: {} ({} IPv4, {} IPv6), Columns: {}, Data: {} KB, Size: {} KB",
            self.record_count,
            self.ipv4_ranges,
            self.ipv6_ranges,
            self.column_count,
            self.data_size / 1024,
            self.file_size / 1024
        )
    }
}

/// Check every index record of an opened database.
pub fn validate<R: ReadAt + ?Sized>(source: &R, layout: &Layout) -> ValidationReport {
    let mut report = ValidationReport::new();
    let engine = SearchEngine::new(source, layout);
    let columns = layout.columns().count();

    report.stats.file_size = layout.file_len;
    report.stats.record_count = layout.index_count;
    report.stats.column_count = columns;
    report.stats.data_size = layout.data_size;

    if layout.date.len() != 8 || !layout.date.bytes().all(|b| b.is_ascii_digit()) {
        report.warning(format!(
            "Build date {:?} is not eight ASCII digits",
            layout.date
        ));
    }

    let mut previous: Option<u128> = None;
    let mut order_errors = 0usize;
    let mut payload_errors = 0usize;

    for i in 0..layout.index_count {
        let record = match engine.record(i) {
            Ok(record) => record,
            Err(e) => {
                report.error(format!("Record {}: {}", i, e));
                break;
            }
        };
        let key = record.key_u128();

        if key <= u32::MAX as u128 {
            report.stats.ipv4_ranges += 1;
        } else {
            report.stats.ipv6_ranges += 1;
        }

        if let Some(prev) = previous {
            if key < prev {
                order_errors += 1;
                if order_errors <= MAX_RECORD_MESSAGES {
                    report.error(format!(
                        "Record {}: key {} sorts below previous key {}",
                        i,
                        RangeKey::from_bytes(record.key).to_ip_addr(),
                        RangeKey::from_bytes(prev.to_be_bytes()).to_ip_addr()
                    ));
                }
            } else if key == prev {
                report.stats.duplicate_keys += 1;
            }
        }
        previous = Some(key);

        match engine.payload(&record) {
            Ok(payload) => {
                let values = payload.split(',').count();
                if values != columns {
                    report.stats.column_mismatches += 1;
                }
            }
            Err(e) => {
                payload_errors += 1;
                if payload_errors <= MAX_RECORD_MESSAGES {
                    report.error(format!("Record {}: {}", i, e));
                }
            }
        }
    }

    if order_errors > MAX_RECORD_MESSAGES {
        report.error(format!(
            "{} more out-of-order keys not shown",
            order_errors - MAX_RECORD_MESSAGES
        ));
    }
    if payload_errors > MAX_RECORD_MESSAGES {
        report.error(format!(
            "{} more unreadable payloads not shown",
            payload_errors - MAX_RECORD_MESSAGES
        ));
    }
    if report.stats.duplicate_keys > 0 {
        report.warning(format!(
            "{} records share a key with their predecessor; an exact-key lookup returns whichever duplicate the search reaches first",
            report.stats.duplicate_keys
        ));
    }
    if report.stats.column_mismatches > 0 {
        report.warning(format!(
            "{} records have a field count different from the {} header columns",
            report.stats.column_mismatches, columns
        ));
    }

    report.info(report.stats.summary());

    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        records = layout.index_count,
        "validated database"
    );

    report
}
