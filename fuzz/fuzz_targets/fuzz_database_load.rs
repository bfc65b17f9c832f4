#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic: open, look up, and validate
    if let Ok(db) = ipsrvdb::Database::from_bytes(data.to_vec()) {
        let _ = db.find("0.0.0.0");
        let _ = db.find("8.8.8.8");
        let _ = db.find("255.255.255.255");
        let _ = db.find("2001:db8::1");
        let _ = db.find_fields("10.0.0.1");
        let _ = db.validate();
    }
});
