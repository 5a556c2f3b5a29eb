//! Rust `Cargo.lock` parser.
//!
//! A line-based state machine over `[[package]]` tables rather than a full
//! TOML parse, so a truncated lockfile still yields every complete entry.

use super::{read_lines, unquote, Fragments, ManifestKind, ManifestParser};
use crate::error::Result;
use crate::model::RawFragment;
use std::path::Path;

/// Parser for Cargo lockfiles
#[derive(Debug, Clone, Copy, Default)]
pub struct CargoLockParser;

/// Iterator state over the lines of one lockfile.
struct PackageTables<I> {
    lines: I,
    in_package: bool,
    name: Option<String>,
    version: Option<String>,
    finished: bool,
}

impl<I: Iterator<Item = String>> PackageTables<I> {
    fn new(lines: I) -> Self {
        Self {
            lines,
            in_package: false,
            name: None,
            version: None,
            finished: false,
        }
    }

    /// Emit the current table if it has both a name and a version.
    fn take_table(&mut self) -> Option<RawFragment> {
        let name = self.name.take();
        let version = self.version.take();
        match (name, version) {
            (Some(name), Some(version)) => Some(RawFragment::new(name, version)),
            _ => None,
        }
    }
}

impl<I: Iterator<Item = String>> Iterator for PackageTables<I> {
    type Item = RawFragment;

    fn next(&mut self) -> Option<RawFragment> {
        if self.finished {
            return None;
        }
        loop {
            let Some(line) = self.lines.next() else {
                self.finished = true;
                return self.take_table();
            };
            let line = line.trim();

            if line.starts_with('[') {
                let table = self.take_table();
                self.in_package = line == "[[package]]";
                if table.is_some() {
                    return table;
                }
                continue;
            }
            if !self.in_package || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let value = unquote(value).to_string();
                match key.trim() {
                    "name" => self.name = Some(value),
                    "version" => self.version = Some(value),
                    _ => {}
                }
            }
        }
    }
}

impl ManifestParser for CargoLockParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::CargoLock
    }

    fn fragments(&self, path: &Path) -> Result<Fragments> {
        Ok(Box::new(PackageTables::new(read_lines(path)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Vec<RawFragment> {
        PackageTables::new(text.lines().map(str::to_string)).collect()
    }

    #[test]
    fn test_package_tables() {
        let out = decode(
            r#"# This file is automatically @generated by Cargo.
version = 3

[[package]]
name = "bumpalo"
version = "3.12.0"
source = "registry+https://github.com/rust-lang/crates.io-index"

[[package]]
name = "yaml-rust"
version = "0.4.5"
dependencies = [
 "linked-hash-map",
]

[metadata]
name = "ignored"
version = "0.0.0"
"#,
        );
        assert_eq!(
            out,
            vec![
                RawFragment::new("bumpalo", "3.12.0"),
                RawFragment::new("yaml-rust", "0.4.5"),
            ]
        );
    }

    #[test]
    fn test_truncated_lockfile_keeps_complete_entries() {
        let out = decode("[[package]]\nname = \"libc\"\nversion = \"0.2.139\"\n\n[[package]]\nname = \"nix\"\n");
        assert_eq!(out, vec![RawFragment::new("libc", "0.2.139")]);
    }

    #[test]
    fn test_lockfile_version_line_is_not_a_package() {
        let out = decode("version = 3\n");
        assert!(out.is_empty());
    }
}
