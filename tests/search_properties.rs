//! Property tests for range resolution.

mod common;

use common::{build_db, Entry};
use ipsrvdb::Database;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/// Sorted, distinct IPv4 range starts.
fn range_starts() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::btree_set(any::<u32>(), 1..64)
        .prop_map(|set: BTreeSet<u32>| set.into_iter().collect())
}

fn database(starts: &[u32]) -> Database {
    let entries: Vec<Entry> = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            Entry::new(&Ipv4Addr::from(start).to_string(), &format!("r{},{}", i, start))
        })
        .collect();
    Database::from_bytes(build_db(&entries, "id,start", "20240101", "prop")).unwrap()
}

/// Reference answer: last start <= addr.
fn expected(starts: &[u32], addr: u32) -> Option<usize> {
    starts.iter().rposition(|&s| s <= addr)
}

proptest! {
    #[test]
    fn prop_find_returns_containing_range(starts in range_starts(), addr in any::<u32>()) {
        let db = database(&starts);
        let got = db.find(&Ipv4Addr::from(addr).to_string()).unwrap();
        let want = expected(&starts, addr).map(|i| format!("r{},{}", i, starts[i]));
        prop_assert_eq!(got, want);
    }

    #[test]
    fn prop_range_starts_match_exactly(starts in range_starts()) {
        let db = database(&starts);
        for (i, &start) in starts.iter().enumerate() {
            let got = db.find(&Ipv4Addr::from(start).to_string()).unwrap();
            prop_assert_eq!(got, Some(format!("r{},{}", i, start)));
        }
    }

    #[test]
    fn prop_fields_keys_equal_columns(starts in range_starts(), addr in any::<u32>()) {
        let db = database(&starts);
        let fields = db.find_fields(&Ipv4Addr::from(addr).to_string()).unwrap();
        if expected(&starts, addr).is_some() {
            let mut keys: Vec<_> = fields.keys().cloned().collect();
            keys.sort();
            prop_assert_eq!(keys, vec!["id".to_string(), "start".to_string()]);
        } else {
            prop_assert!(fields.is_empty());
        }
    }

    #[test]
    fn prop_generated_databases_validate(starts in range_starts()) {
        let report = database(&starts).validate();
        prop_assert!(report.is_valid(), "{:?}", report.errors);
    }
}
