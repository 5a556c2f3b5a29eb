#![no_main]
use cve_inventory::sbom::{parse_packages_str, SbomType};
use libfuzzer_sys::fuzz_target;

/// Fuzz every SBOM reader with the same input.
///
/// Also wraps the input in a CycloneDX JSON envelope to reach the
/// component walk rather than failing at detection.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for sbom_type in [SbomType::Spdx, SbomType::CycloneDx, SbomType::Swid] {
            let _ = parse_packages_str(s, sbom_type, false);
            let _ = parse_packages_str(s, sbom_type, true);
        }

        if s.len() < 10_000 {
            let wrapped = format!(r#"{{"bomFormat":"CycloneDX","specVersion":"1.5","components":[{s}]}}"#);
            let _ = parse_packages_str(&wrapped, SbomType::CycloneDx, false);
        }
    }
});
