use crate::naming::derive_system_name;
use archmap_protocol::FileRecord;
use std::collections::{BTreeMap, BTreeSet};

/// File names whose presence marks a directory as a deliberate, self-contained system.
pub const FINGERPRINT_FILES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "types.ts",
    "api.ts",
    "service.ts",
    "client.ts",
    "__init__.py",
    "mod.rs",
    "lib.rs",
];

pub fn is_fingerprint_file(file_name: &str) -> bool {
    FINGERPRINT_FILES
        .iter()
        .any(|candidate| file_name.eq_ignore_ascii_case(candidate))
}

/// Pre-consolidation grouping of files sharing a derived name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemCluster {
    pub key: String,
    pub files: BTreeSet<String>,
    pub directories: BTreeSet<String>,
    pub total_lines: usize,
    /// Sticky: once set by any member file it never reverts
    pub has_fingerprint: bool,
    pub imports_seen: BTreeSet<String>,
}

impl SystemCluster {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Add one record. Returns `false` (and changes nothing) if the path is already a member.
    pub fn add_record(&mut self, record: &FileRecord) -> bool {
        if !self.files.insert(record.path.clone()) {
            return false;
        }
        self.total_lines += record.lines;
        self.directories.insert(record.directory.clone());
        self.imports_seen.extend(record.imports.iter().cloned());
        self.has_fingerprint |= is_fingerprint_file(record.file_name());
        true
    }

    /// Fold another cluster's members into this one. The fingerprint is not inherited.
    pub fn absorb(&mut self, other: SystemCluster) {
        self.total_lines += other.total_lines;
        self.files.extend(other.files);
        self.directories.extend(other.directories);
        self.imports_seen.extend(other.imports_seen);
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Shallowest member directory, ties broken lexicographically.
    pub fn principal_directory(&self) -> Option<&str> {
        self.directories
            .iter()
            .min_by(|a, b| {
                directory_depth(a)
                    .cmp(&directory_depth(b))
                    .then_with(|| a.cmp(b))
            })
            .map(String::as_str)
    }
}

fn directory_depth(dir: &str) -> usize {
    dir.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .count()
}

/// Group records by derived name. Duplicate paths are counted once.
pub fn aggregate(records: &[FileRecord]) -> BTreeMap<String, SystemCluster> {
    let mut clusters: BTreeMap<String, SystemCluster> = BTreeMap::new();
    for record in records {
        let key = derive_system_name(&record.path);
        let cluster = clusters
            .entry(key.clone())
            .or_insert_with(|| SystemCluster::new(key));
        if !cluster.add_record(record) {
            log::debug!("Ignoring duplicate file record {}", record.path);
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(path: &str, lines: usize, imports: &[&str]) -> FileRecord {
        FileRecord::new(
            path,
            lines,
            imports.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn groups_files_by_derived_name() {
        let clusters = aggregate(&[
            record("src/auth/index.ts", 10, &["../api/client"]),
            record("src/auth/session.ts", 5, &["react"]),
            record("src/billing/invoice.ts", 7, &[]),
        ]);

        assert_eq!(clusters.len(), 2);
        let auth = &clusters["auth"];
        assert_eq!(auth.file_count(), 2);
        assert_eq!(auth.total_lines, 15);
        assert!(auth.has_fingerprint);
        assert_eq!(
            auth.imports_seen.iter().cloned().collect::<Vec<_>>(),
            vec!["../api/client".to_string(), "react".to_string()]
        );
        assert!(!clusters["billing"].has_fingerprint);
    }

    #[test]
    fn fingerprint_is_sticky_and_case_insensitive() {
        let mut cluster = SystemCluster::new("auth");
        cluster.add_record(&record("auth/Index.TS", 1, &[]));
        cluster.add_record(&record("auth/other.ts", 1, &[]));
        assert!(cluster.has_fingerprint);
        assert!(is_fingerprint_file("__INIT__.py"));
        assert!(!is_fingerprint_file("indexer.ts"));
    }

    #[test]
    fn duplicate_paths_are_counted_once() {
        let clusters = aggregate(&[record("a/x.ts", 4, &[]), record("a/x.ts", 4, &[])]);
        assert_eq!(clusters["a"].file_count(), 1);
        assert_eq!(clusters["a"].total_lines, 4);
    }

    #[test]
    fn principal_directory_prefers_shallowest() {
        let mut cluster = SystemCluster::new("auth");
        cluster.add_record(&record("src/auth/login/form.ts", 1, &[]));
        cluster.add_record(&record("src/auth/components/x.ts", 1, &[]));
        cluster.add_record(&record("src/zeta/auth/y.ts", 1, &[]));
        assert_eq!(cluster.principal_directory(), Some("src/auth/components"));

        assert_eq!(SystemCluster::new("empty").principal_directory(), None);
    }

    #[test]
    fn absorb_does_not_inherit_fingerprint() {
        let mut other = SystemCluster::new("other");
        let mut small = SystemCluster::new("auth");
        small.add_record(&record("auth/index.ts", 3, &["x"]));
        other.absorb(small);
        assert!(!other.has_fingerprint);
        assert_eq!(other.file_count(), 1);
        assert_eq!(other.total_lines, 3);
        assert!(other.imports_seen.contains("x"));
    }
}
