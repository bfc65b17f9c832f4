//! Error types for the ipsrvdb library
use std::fmt;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, IpsrvError>;

/// Main error type for database operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpsrvError {
    /// I/O errors (opening, stat, positioned reads)
    Io(String),

    /// Memory mapping errors
    Mmap(String),

    /// The backend could not supply the requested bytes
    ShortRead {
        /// Offset the read started at
        offset: u64,
        /// Number of bytes requested
        requested: usize,
        /// Number of bytes actually available
        available: usize,
    },

    /// Query string is not an IPv4 or IPv6 literal
    MalformedAddress(String),

    /// Access mode string is not one of mmap/file/memory
    UnknownMode(String),

    /// Format/parsing errors
    Format(String),
}

impl fmt::Display for IpsrvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpsrvError::Io(msg) => write!(f, "I/O error: {}", msg),
            IpsrvError::Mmap(msg) => write!(f, "Memory mapping error: {}", msg),
            IpsrvError::ShortRead {
                offset,
                requested,
                available,
            } => write!(
                f,
                "Short read at offset {}: requested {} bytes, {} available",
                offset, requested, available
            ),
            IpsrvError::MalformedAddress(addr) => {
                write!(f, "Malformed IP address: {:?}", addr)
            }
            IpsrvError::UnknownMode(mode) => {
                write!(
                    f,
                    "Unknown access mode {:?} (expected mmap, file or memory)",
                    mode
                )
            }
            IpsrvError::Format(msg) => write!(f, "Format error: {}", msg),
        }
    }
}

impl std::error::Error for IpsrvError {}

impl From<std::io::Error> for IpsrvError {
    fn from(err: std::io::Error) -> Self {
        IpsrvError::Io(err.to_string())
    }
}
