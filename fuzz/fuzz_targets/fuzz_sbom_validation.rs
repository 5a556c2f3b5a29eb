#![no_main]
use cve_inventory::sbom::validation::{validate_cyclonedx_xml, validate_spdx_xml, validate_swid};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = validate_spdx_xml(s);
        let _ = validate_cyclonedx_xml(s);
        let _ = validate_swid(s);
    }
});
