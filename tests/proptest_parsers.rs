//! Property-based tests for decoders and codecs.
//!
//! Decoders must never panic on arbitrary input, including random strings,
//! truncated documents and JSON- or XML-like fragments. Codec properties
//! check that CPE forms agree and that PURLs round trip.

use cve_inventory::{
    codec::{decode_cpe22, decode_cpe23, purl},
    model::Ecosystem,
    parsers::{ManifestKind, ParserSet, MANIFEST_FILES},
    sbom::validation::{validate_cyclonedx_xml, validate_spdx_xml, validate_swid},
    RawFragment, SbomIngestor, SbomType, StaticIndex, VendorResolver,
};
use proptest::prelude::*;

/// Decode `content` as the manifest named `file_name`, returning how many
/// fragments came out.
fn decode_manifest(file_name: &str, content: &str) -> usize {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);
    std::fs::write(&path, content).unwrap();
    let kind = ManifestKind::from_path(&path).unwrap();
    ParserSet::default().get(kind).parse_file(&path).count()
}

fn ingest(file_name: &str, content: &str, sbom_type: SbomType) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);
    std::fs::write(&path, content).unwrap();
    let ingestor = SbomIngestor::new(VendorResolver::new(StaticIndex::new()));
    let _ = ingestor.ingest_or_empty(&path, sbom_type);
}

fn file_names() -> impl Strategy<Value = &'static str> {
    // requirements.txt would spawn pip for every case
    let names: Vec<&'static str> = MANIFEST_FILES
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| *name != "requirements.txt")
        .collect();
    prop::sample::select(names)
}

proptest! {
    // Every case touches the filesystem, so keep the count moderate.
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn manifest_parsers_dont_panic(name in file_names(), s in "\\PC{0,600}") {
        let _ = decode_manifest(name, &s);
    }

    #[test]
    fn truncated_lockfiles_dont_panic(cut in 0usize..400) {
        let lock = concat!(
            "[[package]]\nname = \"serde\"\nversion = \"1.0.152\"\n\n",
            "[[package]]\nname = \"libc\"\nversion = \"0.2.139\"\n"
        );
        let json = r#"{"name":"a","version":"1.0.0","lockfileVersion":2,"packages":{"node_modules/lodash":{"version":"4.17.21","requires":{"x":"1.0"}}}}"#;
        let _ = decode_manifest("Cargo.lock", &lock[..cut.min(lock.len())]);
        let _ = decode_manifest("package-lock.json", &json[..cut.min(json.len())]);
    }

    #[test]
    fn json_like_input_doesnt_panic(
        s in prop::string::string_regex(r#"\{[^\}]{0,300}\}"#).unwrap()
    ) {
        let _ = decode_manifest("composer.lock", &s);
        let _ = decode_manifest("renv.lock", &s);
        ingest("doc.cdx.json", &s, SbomType::CycloneDx);
        ingest("doc.spdx.json", &s, SbomType::Spdx);
    }

    #[test]
    fn xml_like_input_doesnt_panic(
        s in prop::string::string_regex(r#"<[a-zA-Z]{1,12}>[^<]{0,100}</[a-zA-Z]{1,12}>"#).unwrap()
    ) {
        let _ = decode_manifest("pom.xml", &s);
        let _ = validate_spdx_xml(&s);
        let _ = validate_cyclonedx_xml(&s);
        let _ = validate_swid(&s);
        ingest("doc.swidtag", &s, SbomType::Swid);
        ingest("doc.cdx.xml", &s, SbomType::CycloneDx);
    }

    #[test]
    fn cpe_decoders_dont_panic(s in "\\PC{0,200}") {
        let _ = decode_cpe23(&s);
        let _ = decode_cpe22(&s);
        let _ = purl::decode(&s);
    }

    #[test]
    fn cpe_forms_agree(
        vendor in "[a-z][a-z0-9_]{0,15}",
        product in "[a-z][a-z0-9_]{0,15}",
        version in "[0-9]{1,3}(\\.[0-9]{1,3}){0,2}",
    ) {
        let v23 = decode_cpe23(&format!("cpe:2.3:a:{vendor}:{product}:{version}:*:*:*:*:*:*:*")).unwrap();
        let v22 = decode_cpe22(&format!("cpe:/a:{vendor}:{product}:{version}")).unwrap();
        prop_assert_eq!(v23, v22);
    }

    #[test]
    fn purl_round_trip(
        ecosystem in prop::sample::select(Ecosystem::ALL.to_vec()),
        product in "[a-z][a-z0-9._-]{0,20}",
        version in "[0-9]{1,3}\\.[0-9]{1,3}(\\.[0-9]{1,3})?(\\+[a-z0-9]{1,6})?",
    ) {
        let encoded = purl::encode(ecosystem, &product, &version, &[], None).unwrap();
        let decoded = purl::decode(&encoded).unwrap();
        // pypi names are normalized with `_` spelled `-`
        let expected = match ecosystem {
            Ecosystem::PyPi => product.replace('_', "-"),
            _ => product,
        };
        prop_assert_eq!(decoded.product, expected);
        prop_assert_eq!(decoded.version, version);
        prop_assert_eq!(decoded.ecosystem, Some(ecosystem));
    }

    #[test]
    fn resolve_is_deterministic(product in "[a-z]{1,6}(-[a-z]{1,6}){0,3}") {
        let index = StaticIndex::new().with("flask", "palletsprojects").with("zlib", "gnu");
        let resolver = VendorResolver::new(index);
        let fragment = RawFragment::new(product, "1.0");
        prop_assert_eq!(resolver.resolve(&fragment), resolver.resolve(&fragment));
    }
}
