//! Name-directed scans over an archive.
//!
//! These operations cover the common ways a caller locates members: check
//! which of a set of names exist, pull out a single member by name, or
//! accumulate several members into a map. Each one consumes the stream, so
//! the underlying source is released on every exit path, found or not.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::zip::ZipStream;

/// The set of member names one scan is interested in.
///
/// An explicit value rather than ad hoc string comparisons, so a scan's
/// result can be checked against the requested set wholesale. Matching is
/// exact: no path-separator or case normalization is applied on either
/// side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    names: BTreeSet<String>,
}

impl MatchSet {
    /// An empty match set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of names in the set.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The names, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MatchSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<R: Read> ZipStream<R> {
    /// Scan the archive and report which of `wanted`'s names are present.
    ///
    /// Entries are visited in storage order and only their names are
    /// inspected; payloads are skipped. The scan stops early once every
    /// wanted name has been seen. The result equals `wanted` exactly when
    /// the archive contains every requested member.
    pub fn found_names(mut self, wanted: &MatchSet) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        while found.len() < wanted.len() {
            let Some(entry) = self.next_entry()? else {
                break;
            };
            if wanted.contains(entry.name()) {
                debug!("matched entry {:?}", entry.name());
                found.insert(entry.name().to_string());
            } else {
                trace!("no match for entry {:?}", entry.name());
            }
        }
        Ok(found)
    }

    /// Extract the uncompressed content of the member named `name`.
    ///
    /// Stops at the first match, so if a malformed archive stores several
    /// members under the same name, the first one in storage order wins.
    /// Fails with [`Error::EntryNotFound`] when the archive is exhausted
    /// without a match.
    pub fn read_member(mut self, name: &str) -> Result<Vec<u8>> {
        while let Some(mut entry) = self.next_entry()? {
            if entry.name() == name {
                debug!("extracting entry {:?} ({} bytes)", name, entry.size());
                return entry.read_to_vec();
            }
            trace!("no match for entry {:?}", entry.name());
        }
        Err(Error::EntryNotFound(name.to_string()))
    }

    /// Extract every member whose name is in `wanted`, keyed by name.
    ///
    /// The whole archive is scanned, so if a malformed archive stores
    /// several members under the same name, the last one in storage order
    /// wins. Fails with [`Error::EntryNotFound`] naming a missing member
    /// when any requested name never appears.
    pub fn read_members(mut self, wanted: &MatchSet) -> Result<BTreeMap<String, Vec<u8>>> {
        let mut found = BTreeMap::new();
        while let Some(mut entry) = self.next_entry()? {
            if wanted.contains(entry.name()) {
                debug!("extracting entry {:?} ({} bytes)", entry.name(), entry.size());
                let name = entry.name().to_string();
                let content = entry.read_to_vec()?;
                found.insert(name, content);
            }
        }
        if let Some(missing) = wanted.iter().find(|name| !found.contains_key(*name)) {
            return Err(Error::EntryNotFound(missing.to_string()));
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Build a throwaway archive with the real writer from the `zip`
    /// crate, deflated, to cross-check this reader against an independent
    /// producer.
    fn deflated_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn fixture() -> Vec<u8> {
        deflated_archive(&[
            ("alpha.csv", b"a,b,c\n1,2,3\n"),
            ("beta.txt", b"second member"),
            ("nested/gamma.bin", &[0u8; 512]),
        ])
    }

    #[test]
    fn found_names_reports_exactly_the_present_subset() {
        let wanted: MatchSet = ["alpha.csv", "nested/gamma.bin", "missing.pdf"]
            .into_iter()
            .collect();
        let found = ZipStream::open(Cursor::new(fixture()))
            .unwrap()
            .found_names(&wanted)
            .unwrap();

        let expected: BTreeSet<String> = ["alpha.csv", "nested/gamma.bin"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn found_names_with_empty_match_set_scans_nothing() {
        let found = ZipStream::open(Cursor::new(fixture()))
            .unwrap()
            .found_names(&MatchSet::new())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn read_member_returns_deflated_content() {
        let content = ZipStream::open(Cursor::new(fixture()))
            .unwrap()
            .read_member("beta.txt")
            .unwrap();
        assert_eq!(content, b"second member");
    }

    #[test]
    fn read_member_fails_for_absent_name() {
        let err = ZipStream::open(Cursor::new(fixture()))
            .unwrap()
            .read_member("delta.txt")
            .unwrap_err();
        match err {
            Error::EntryNotFound(name) => assert_eq!(name, "delta.txt"),
            other => panic!("expected EntryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn read_members_collects_the_requested_map() {
        let wanted: MatchSet = ["alpha.csv", "beta.txt"].into_iter().collect();
        let members = ZipStream::open(Cursor::new(fixture()))
            .unwrap()
            .read_members(&wanted)
            .unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members["alpha.csv"], b"a,b,c\n1,2,3\n");
        assert_eq!(members["beta.txt"], b"second member");
    }

    #[test]
    fn read_members_reports_the_missing_name() {
        let wanted: MatchSet = ["alpha.csv", "delta.txt"].into_iter().collect();
        let err = ZipStream::open(Cursor::new(fixture()))
            .unwrap()
            .read_members(&wanted)
            .unwrap_err();
        match err {
            Error::EntryNotFound(name) => assert_eq!(name, "delta.txt"),
            other => panic!("expected EntryNotFound, got {other:?}"),
        }
    }

    #[test]
    fn file_backed_source_reads_like_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        std::fs::write(&path, fixture()).unwrap();

        let content = ZipStream::open(std::fs::File::open(&path).unwrap())
            .unwrap()
            .read_member("beta.txt")
            .unwrap();
        assert_eq!(content, b"second member");
    }

    #[test]
    fn match_set_collects_from_mixed_string_types() {
        let set: MatchSet = vec!["a".to_string(), "b".to_string()].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(set.contains("a"));
        assert!(!set.contains("c"));
        assert_eq!(set.iter().collect::<Vec<_>>(), ["a", "b"]);
    }
}
