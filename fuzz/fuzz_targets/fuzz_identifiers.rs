#![no_main]
use cve_inventory::codec::{decode_cpe22, decode_cpe23, purl};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = decode_cpe23(s);
        let _ = decode_cpe22(s);
        let _ = purl::decode(s);
    }
});
