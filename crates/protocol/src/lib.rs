//! # Archmap Protocol
//!
//! Serde data model shared by every archmap stage.
//!
//! ```text
//! ScanData (tree walker)
//!     │
//!     └──> SystemsReport (identification engine)
//!            ├─ systems: key -> System
//!            ├─ summary
//!            └─ scan_data passthrough
//!
//! ArchitectureConfig (persisted between runs, user-editable)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag written into every persisted config.
pub const CONFIG_VERSION: &str = "3.0";

/// Default file name of the persisted config, relative to the scanned root.
pub const CONFIG_FILE_NAME: &str = "architecture-config.json";

/// Reserved key of the catch-all bucket.
pub const OTHER_SYSTEM: &str = "other";

/// Name derived for files with no usable directory segment.
pub const ROOT_SYSTEM: &str = "root";

/// Tag reported in `Summary::discovery_method`.
pub const DISCOVERY_METHOD: &str = "bottom_up_partition";

/// One file produced by the tree walker. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the scanned root, forward slashes.
    pub path: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub extension: String,

    /// Parent directory of `path`, `.` for root-level files.
    #[serde(default)]
    pub directory: String,

    #[serde(default)]
    pub lines: usize,

    /// Raw import specifiers as written in the source.
    #[serde(default)]
    pub imports: Vec<String>,
}

impl FileRecord {
    /// Build a record from a relative path, filling name/extension/directory from it.
    pub fn new(path: impl Into<String>, lines: usize, imports: Vec<String>) -> Self {
        let path = path.into().replace('\\', "/");
        let (directory, name) = match path.rsplit_once('/') {
            Some((dir, name)) if !dir.is_empty() => (dir.to_string(), name.to_string()),
            Some((_, name)) => (default_directory(), name.to_string()),
            None => (default_directory(), path.clone()),
        };
        let extension = name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        Self {
            path,
            name,
            extension,
            directory,
            lines,
            imports,
        }
    }

    /// Fill `name`, `extension` and `directory` from `path` where the producer left them out.
    pub fn with_derived_fields(mut self) -> Self {
        let derived = FileRecord::new(self.path.clone(), self.lines, Vec::new());
        if self.name.is_empty() {
            self.name = derived.name;
        }
        if self.extension.is_empty() {
            self.extension = derived.extension;
        }
        if self.directory.is_empty() {
            self.directory = derived.directory;
        }
        self
    }

    /// File name component, falling back to the last path segment when `name` is absent.
    pub fn file_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_root() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_files: usize,
    pub total_directories: usize,
    pub total_lines: usize,
}

/// Output of the tree walker, input of the identification engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanData {
    #[serde(default = "default_root")]
    pub root: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<String>,

    #[serde(default)]
    pub summary: ScanSummary,

    pub files: Vec<FileRecord>,

    #[serde(default)]
    pub directories: Vec<String>,
}

impl ScanData {
    pub fn new(root: impl Into<String>, files: Vec<FileRecord>) -> Self {
        let summary = ScanSummary {
            total_files: files.len(),
            total_directories: 0,
            total_lines: files.iter().map(|f| f.lines).sum(),
        };
        Self {
            root: root.into(),
            scanned_at: None,
            summary,
            files,
            directories: Vec::new(),
        }
    }
}

/// A named logical subsystem, the unit exposed to renderers.
///
/// The same shape is persisted in [`ArchitectureConfig::systems`], which is why
/// every field tolerates absence on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct System {
    pub name: String,
    pub description: String,
    pub file_count: usize,
    pub total_lines: usize,
    pub directories: Vec<String>,
    pub files: Vec<String>,
    pub depends_on: Vec<String>,
    pub imported_by: Vec<String>,
    pub used_by: Vec<String>,
    pub business_rules: Vec<String>,
    pub has_fingerprint: bool,
    pub user_modified: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub total_systems: usize,
    pub total_files: usize,
    pub total_lines: usize,
    pub discovery_method: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanInfo {
    pub root: String,
    pub scanned_at: Option<String>,
}

/// Final output of one identification run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemsReport {
    pub systems: BTreeMap<String, System>,
    pub summary: Summary,
    pub scan_data: ScanInfo,
}

impl SystemsReport {
    /// Systems ordered largest first, ties by key.
    pub fn systems_by_size(&self) -> Vec<(&String, &System)> {
        let mut ordered: Vec<_> = self.systems.iter().collect();
        ordered.sort_by(|a, b| b.1.file_count.cmp(&a.1.file_count).then_with(|| a.0.cmp(b.0)));
        ordered
    }
}

/// Persisted state that survives across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArchitectureConfig {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<String>,
    pub root: String,
    pub systems: BTreeMap<String, System>,
}
