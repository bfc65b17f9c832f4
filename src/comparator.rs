//! Range-start key ordering
//!
//! Stored keys are 16 bytes compared as unsigned 128-bit big-endian integers.
//! IPv4 ranges are stored with the address in the low 4 bytes and zeros in the
//! high 12, so an IPv4 query is normalized the same way before comparison. A
//! stored key with any non-zero high byte therefore sorts above every IPv4
//! address.
//!
//! IPv6 queries, including IPv4-mapped forms like `::ffff:1.2.3.4`, use their 16
//! bytes unchanged.

use crate::endian::KEY_SIZE;
use crate::error::{IpsrvError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A query address normalized to the stored key representation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RangeKey([u8; KEY_SIZE]);

impl RangeKey {
    /// Wrap 16 raw key bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        RangeKey(bytes)
    }

    /// Parse an IPv4 or IPv6 literal.
    ///
    /// # Errors
    ///
    /// Returns [`IpsrvError::MalformedAddress`] when `s` is neither.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse::<IpAddr>()
            .map(Self::from)
            .map_err(|_| IpsrvError::MalformedAddress(s.to_string()))
    }

    /// Raw key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// The key as a 128-bit unsigned integer.
    #[inline]
    pub fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Best-effort address for display: keys with a zero high 96 bits print
    /// as IPv4.
    pub fn to_ip_addr(self) -> IpAddr {
        let value = self.to_u128();
        if value <= u32::MAX as u128 {
            IpAddr::V4(Ipv4Addr::from(value as u32))
        } else {
            IpAddr::V6(Ipv6Addr::from(value))
        }
    }
}

impl From<Ipv4Addr> for RangeKey {
    fn from(addr: Ipv4Addr) -> Self {
        let mut key = [0u8; KEY_SIZE];
        key[KEY_SIZE - 4..].copy_from_slice(&addr.octets());
        RangeKey(key)
    }
}

impl From<Ipv6Addr> for RangeKey {
    fn from(addr: Ipv6Addr) -> Self {
        RangeKey(addr.octets())
    }
}

impl From<IpAddr> for RangeKey {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl FromStr for RangeKey {
    type Err = IpsrvError;

    fn from_str(s: &str) -> Result<Self> {
        RangeKey::parse(s)
    }
}

impl fmt::Debug for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RangeKey({:#034x})", self.to_u128())
    }
}

/// Order a stored key against a normalized query.
///
/// `Greater` means the stored range starts above the query.
#[inline]
pub fn compare(stored: &[u8; KEY_SIZE], query: &RangeKey) -> Ordering {
    // Lexicographic order on big-endian bytes is numeric order
    stored.cmp(&query.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RangeKey {
        RangeKey::parse(s).unwrap()
    }

    #[test]
    fn test_ipv4_is_zero_extended() {
        let k = key("8.8.8.255");
        let mut expected = [0u8; 16];
        expected[12..].copy_from_slice(&[8, 8, 8, 255]);
        assert_eq!(k.as_bytes(), &expected);
        assert_eq!(k.to_u128(), 0x080808FF);
    }

    #[test]
    fn test_ipv6_bytes_unchanged() {
        let k = key("2001:db8::1");
        assert_eq!(k.as_bytes(), &"2001:db8::1".parse::<Ipv6Addr>().unwrap().octets());
    }

    #[test]
    fn test_mapped_ipv6_is_not_ipv4() {
        // ::ffff:8.8.8.8 keeps its 0xffff marker bytes
        assert_ne!(key("::ffff:8.8.8.8"), key("8.8.8.8"));
        assert!(key("::ffff:8.8.8.8") > key("255.255.255.255"));
    }

    #[test]
    fn test_compare_orders() {
        let stored = *key("8.8.8.0").as_bytes();
        assert_eq!(compare(&stored, &key("8.8.8.0")), Ordering::Equal);
        assert_eq!(compare(&stored, &key("8.8.8.255")), Ordering::Less);
        assert_eq!(compare(&stored, &key("8.8.7.255")), Ordering::Greater);
    }

    #[test]
    fn test_high_bytes_sort_above_ipv4() {
        // Any non-zero high byte puts the stored key above every IPv4 query
        let mut stored = [0u8; 16];
        stored[0] = 1;
        assert_eq!(
            compare(&stored, &key("255.255.255.255")),
            Ordering::Greater
        );
        let mut stored = [0u8; 16];
        stored[11] = 1;
        assert_eq!(
            compare(&stored, &key("255.255.255.255")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_matches_u128() {
        let pairs = [
            ("0.0.0.0", "0.0.0.1"),
            ("1.2.3.4", "::1"),
            ("::ffff:0:0", "2001:db8::"),
            ("ffff::", "fe80::1"),
        ];
        for (a, b) in pairs {
            let (ka, kb) = (key(a), key(b));
            assert_eq!(
                compare(ka.as_bytes(), &kb),
                ka.to_u128().cmp(&kb.to_u128()),
                "{} vs {}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_malformed_address() {
        for bad in ["", "8.8.8", "8.8.8.256", "not an ip", "fe80::1%eth0", " 8.8.8.8"] {
            assert!(
                matches!(RangeKey::parse(bad), Err(IpsrvError::MalformedAddress(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_to_ip_addr() {
        assert_eq!(key("8.8.8.0").to_ip_addr().to_string(), "8.8.8.0");
        assert_eq!(key("2001:db8::").to_ip_addr().to_string(), "2001:db8::");
    }
}
