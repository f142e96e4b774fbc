use crate::filters::PathFilter;
use crate::imports::extract_imports;
use crate::{Result, ScannerError};
use archmap_protocol::{FileRecord, ScanData, ScanSummary, CONFIG_FILE_NAME};
use chrono::{SecondsFormat, Utc};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Dependency, build and cache directories never descended into.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    "__pycache__",
    ".venv",
    "venv",
    ".cache",
    ".turbo",
    ".vercel",
    ".output",
    "out",
    ".svelte-kit",
    "target",
];

/// Code, style, config and doc extensions that are recorded.
pub const CODE_EXTENSIONS: &[&str] = &[
    // Code
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte", "py", "go", "java", "rb", "php", "rs",
    // Styles
    "css", "scss", "less", "sass",
    // Config and docs
    "json", "yaml", "yml", "toml", "md", "mdx",
];

const NOISE_FILE_NAMES: &[&str] = &[
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "cargo.lock",
    CONFIG_FILE_NAME,
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

/// Walks a project and records every relevant file (.gitignore aware).
pub struct FileScanner {
    root: PathBuf,
    filter: PathFilter,
    excluded: Vec<PathBuf>,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            filter: PathFilter::default(),
            excluded: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Never record these files or anything under these directories, e.g.
    /// generated docs. Relative paths resolve against the scan root and need
    /// not exist yet.
    pub fn exclude_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.excluded
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    pub fn scan(&self) -> Result<ScanData> {
        if !self.root.is_dir() {
            return Err(ScannerError::InvalidPath(self.root.display().to_string()));
        }
        let root = fs::canonicalize(&self.root)?;
        log::info!("Scanning {}", root.display());

        let mut files = Vec::new();
        let mut directories = BTreeSet::new();

        let excluded: Vec<PathBuf> = self
            .excluded
            .iter()
            .map(|path| absolute_under(&root, path))
            .collect();
        for path in &excluded {
            log::debug!("Excluding {}", path.display());
        }

        let scope_root = root.clone();
        let mut builder = WalkBuilder::new(&root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false);
        builder.filter_entry(move |entry| {
            let path = entry.path();
            !is_skipped_scope(path, &scope_root) && !excluded.iter().any(|ex| path.starts_with(ex))
        });

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            let Some(rel_path) = relative_path(entry.path(), &root) else {
                continue;
            };

            if file_type.is_dir() {
                directories.insert(rel_path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            if !is_code_file(path) || is_noise_file(path) {
                continue;
            }
            if self.filter.is_active() && !self.filter.allows(&rel_path) {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                if meta.len() > MAX_FILE_SIZE_BYTES {
                    log::debug!(
                        "Skipping large file {} ({} bytes > {})",
                        path.display(),
                        meta.len(),
                        MAX_FILE_SIZE_BYTES
                    );
                    continue;
                }
            }

            match read_record(path, rel_path) {
                Ok(record) => files.push(record),
                Err(e) => log::debug!("Skipping unreadable file {}: {e}", path.display()),
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        let summary = ScanSummary {
            total_files: files.len(),
            total_directories: directories.len(),
            total_lines: files.iter().map(|f| f.lines).sum(),
        };
        log::info!(
            "Scanned {} files in {} directories ({} lines)",
            summary.total_files,
            summary.total_directories,
            summary.total_lines
        );

        Ok(ScanData {
            root: root.to_string_lossy().into_owned(),
            scanned_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            summary,
            files,
            directories: directories.into_iter().collect(),
        })
    }
}

fn read_record(path: &Path, rel_path: String) -> std::io::Result<FileRecord> {
    let content = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let imports = extract_imports(&content, extension);
    Ok(FileRecord::new(rel_path, content.lines().count(), imports))
}

/// Forward-slash path relative to `root`; `None` for the root itself.
fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Absolute, symlink-resolved form of `path`. Missing trailing components are
/// appended to the nearest existing ancestor.
fn absolute_under(root: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    resolve_existing(&joined)
}

fn resolve_existing(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve_existing(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}

fn is_skipped_scope(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    relative.components().any(|component| match component {
        Component::Normal(name) => {
            let lowered = name.to_string_lossy().to_lowercase();
            SKIP_DIRS.iter().any(|skipped| *skipped == lowered)
        }
        _ => false,
    })
}

fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            CODE_EXTENSIONS.iter().any(|candidate| *candidate == ext)
        })
        .unwrap_or(false)
}

fn is_noise_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            NOISE_FILE_NAMES
                .iter()
                .any(|candidate| name.eq_ignore_ascii_case(candidate))
        })
}
