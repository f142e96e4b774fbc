//! # Archmap Systems
//!
//! Turns a flat list of file records into named "systems" without prior
//! knowledge of the codebase's architecture.
//!
//! ## Pipeline
//!
//! ```text
//! FileRecord[]
//!     │
//!     ├──> Name Deriver (path -> lowercase system key)
//!     │
//!     ├──> Clustering Aggregator (key -> SystemCluster)
//!     │
//!     ├──> Consolidator (minimum size, MAX_SYSTEMS cap, `other` bucket)
//!     │
//!     ├──> Dependency Inferencer (import substrings -> depends_on / imported_by)
//!     │
//!     ├──> Config Merger (persisted annotations, optional interactive prompts)
//!     │
//!     └──> Result Assembler (SystemsReport + refreshed ArchitectureConfig)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use archmap_systems::{load_scan_data, ClusterPolicy, SystemIdentifier};
//! use std::path::Path;
//!
//! fn main() -> archmap_systems::Result<()> {
//!     let scan = load_scan_data(Path::new("scan.json"))?;
//!     let identifier = SystemIdentifier::new(ClusterPolicy::default())?;
//!     let report = identifier.identify(&scan, Some(Path::new("architecture-config.json")), None)?;
//!
//!     println!("{} systems", report.summary.total_systems);
//!     Ok(())
//! }
//! ```

mod annotate;
mod cluster;
mod config;
mod consolidate;
mod deps;
mod engine;
mod error;
mod input;
mod naming;
mod observer;
mod policy;

pub use annotate::{
    apply_persisted, fill_descriptions, resolve_answer, run_interactive, Annotation, Annotator,
    InteractiveOutcome, Prompted, OTHER_DESCRIPTION,
};
pub use cluster::{aggregate, is_fingerprint_file, SystemCluster, FINGERPRINT_FILES};
pub use config::{build_config, load_config, resolve_config_path, save_config, ConfigLoad};
pub use consolidate::{consolidate, FoldReason};
pub use deps::{infer_dependencies, DependencyEdges};
pub use engine::{assemble_report, Identification, SystemIdentifier};
pub use error::{Result, SystemsError};
pub use input::{load_scan_data, read_scan_data};
pub use naming::{canonical_name, derive_system_name, display_name, GENERIC_CONTAINERS};
pub use observer::{Event, LogObserver, NoopObserver, Observer};
pub use policy::ClusterPolicy;
