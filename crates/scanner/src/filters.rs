use crate::{Result, ScannerError};

/// Path restrictions applied to scanned files, relative to the scan root.
///
/// Include and exclude entries match whole path prefixes (`src` matches
/// `src/lib.rs` but not `src2/lib.rs`). Exclusion wins over inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    pattern: Option<String>,
}

impl PathFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, paths: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.include.extend(
            paths
                .into_iter()
                .map(|p| normalize_filter_path(p.as_ref()))
                .filter(|p| !p.is_empty()),
        );
        self
    }

    pub fn exclude(mut self, paths: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.exclude.extend(
            paths
                .into_iter()
                .map(|p| normalize_filter_path(p.as_ref()))
                .filter(|p| !p.is_empty()),
        );
        self
    }

    /// Restrict to paths matching a glob (`*`, `?`) or, without wildcards, containing the text.
    pub fn pattern(mut self, pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            self.pattern = None;
            return Ok(self);
        }
        if is_glob(pattern) {
            glob::Pattern::new(pattern)
                .map_err(|e| ScannerError::InvalidPattern(format!("{pattern}: {e}")))?;
        }
        self.pattern = Some(pattern.to_string());
        Ok(self)
    }

    pub fn is_active(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty() || self.pattern.is_some()
    }

    pub fn allows(&self, rel_path: &str) -> bool {
        let rel_path = rel_path.replace('\\', "/");

        if !self.include.is_empty()
            && !self
                .include
                .iter()
                .any(|prefix| prefix_matches(prefix, &rel_path))
        {
            return false;
        }

        if self
            .exclude
            .iter()
            .any(|prefix| prefix_matches(prefix, &rel_path))
        {
            return false;
        }

        matches_file_pattern(&rel_path, self.pattern.as_deref())
    }
}

fn normalize_filter_path(raw: &str) -> String {
    let mut value = raw.trim().replace('\\', "/");
    while let Some(rest) = value.strip_prefix("./") {
        value = rest.to_string();
    }
    let value = value.trim_matches('/');
    if value == "." {
        return String::new();
    }
    value.to_string()
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    if path == prefix {
        return true;
    }
    path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/')
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn matches_file_pattern(path: &str, pattern: Option<&str>) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };

    if !is_glob(pattern) {
        return path.contains(pattern);
    }

    glob::Pattern::new(pattern)
        .map(|p| p.matches(path))
        .unwrap_or(false)
}
