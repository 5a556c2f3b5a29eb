#![no_main]
use cve_inventory::parsers::{ManifestKind, ParserSet, MANIFEST_FILES};
use libfuzzer_sys::fuzz_target;

/// Fuzz the manifest parsers through a scratch file.
///
/// The first byte picks the format; requirements.txt is skipped because it
/// runs pip.
fuzz_target!(|data: &[u8]| {
    let Some((selector, content)) = data.split_first() else {
        return;
    };
    let (name, kind) = MANIFEST_FILES[usize::from(*selector) % MANIFEST_FILES.len()];
    if kind == ManifestKind::PipRequirements {
        return;
    }
    let dir = std::env::temp_dir().join(format!("cve-inventory-fuzz-{}", std::process::id()));
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let path = dir.join(name);
    if std::fs::write(&path, content).is_ok() {
        let _ = ParserSet::default().get(kind).parse_file(&path).count();
    }
});
