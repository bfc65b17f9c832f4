//! Concurrent lookups on one shared handle.

mod common;

use common::{build_db, write_temp, Entry};
use ipsrvdb::{AccessMode, Database};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_lookups_all_backends() {
    let entries: Vec<Entry> = (0..256u32)
        .map(|i| Entry::new(&Ipv4Addr::from(i << 24).to_string(), &format!("net{},{}", i, i)))
        .collect();
    let file = write_temp(&build_db(&entries, "name,octet", "20240101", "threads"));

    for mode in [AccessMode::Mapped, AccessMode::File, AccessMode::Memory] {
        let db = Arc::new(Database::open(file.path(), mode).unwrap());

        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for i in 0..256u32 {
                        let octet = (i + t * 31) % 256;
                        let addr = Ipv4Addr::from((octet << 24) | 0x00AB_CDEF);
                        let fields = db.find_fields(&addr.to_string()).unwrap();
                        assert_eq!(fields["octet"], octet.to_string());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("lookup thread panicked");
        }
    }
}
