#![no_main]
use libfuzzer_sys::fuzz_target;
use std::net::IpAddr;

/// 0.0.0.0 -> "A,1", 8.8.8.0 -> "B,2", 2001:db8:: -> "C,3"
fn fixture() -> Vec<u8> {
    let entries: [(u128, &str); 3] = [
        (0, "A,1"),
        (0x0808_0800, "B,2"),
        (0x2001_0db8 << 96, "C,3"),
    ];
    let mut index = Vec::new();
    let mut data = Vec::new();
    for (key, payload) in entries {
        index.extend_from_slice(&key.to_be_bytes());
        index.extend_from_slice(&(data.len() as i32).to_le_bytes());
        index.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        data.extend_from_slice(payload.as_bytes());
    }
    let mut buf = Vec::new();
    buf.extend_from_slice(&3u64.to_le_bytes());
    buf.extend_from_slice(&(data.len() as u64).to_le_bytes());
    buf.extend_from_slice(&8u16.to_le_bytes());
    buf.extend_from_slice(&index);
    buf.extend_from_slice(&data);
    buf.extend_from_slice(b"name,val");
    buf.extend_from_slice(b"20240101");
    buf
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(db) = ipsrvdb::Database::from_bytes(fixture()) {
            // Malformed strings must come back as errors, not panics
            let _ = db.find(s);
            let _ = db.lookup_fields(s);

            if let Ok(ip) = s.parse::<IpAddr>() {
                assert!(db.find_ip(ip).is_ok());
            }
        }
    }
});
