//! # Archmap Scanner
//!
//! Walks a source tree and records per-file metadata for system identification.
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (.gitignore aware, build/vendor dirs skipped)
//!     │      └─> code, style, config and doc files
//!     │
//!     └──> Per file: relative path, directory, line count, import strings
//!            └─> ScanData
//! ```
//!
//! Import extraction is regex based and deliberately approximate.

mod error;
mod filters;
mod imports;
mod scanner;

pub use error::{Result, ScannerError};
pub use filters::PathFilter;
pub use imports::extract_imports;
pub use scanner::{FileScanner, CODE_EXTENSIONS, SKIP_DIRS};
