use crate::annotate::{apply_persisted, fill_descriptions, run_interactive, Annotator, InteractiveOutcome};
use crate::cluster::{aggregate, SystemCluster};
use crate::config::{build_config, load_config, save_config, ConfigLoad};
use crate::consolidate::consolidate;
use crate::deps::{infer_dependencies, DependencyEdges};
use crate::naming::display_name;
use crate::observer::{Event, LogObserver, Observer};
use crate::policy::ClusterPolicy;
use crate::{Result, SystemsError};
use archmap_protocol::{
    ArchitectureConfig, ScanData, ScanInfo, Summary, System, SystemsReport, DISCOVERY_METHOD,
};
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::Path;

/// Result of an in-memory identification run.
#[derive(Debug, Clone)]
pub struct Identification {
    pub report: SystemsReport,
    /// Config to persist for the next run
    pub config: ArchitectureConfig,
    /// Present when an annotator was supplied
    pub interactive: Option<InteractiveOutcome>,
}

/// Runs the identification pipeline with a fixed policy.
pub struct SystemIdentifier {
    policy: ClusterPolicy,
    observer: Box<dyn Observer>,
}

impl SystemIdentifier {
    pub fn new(policy: ClusterPolicy) -> Result<Self> {
        policy.validate().map_err(SystemsError::InvalidPolicy)?;
        Ok(Self {
            policy,
            observer: Box::new(LogObserver),
        })
    }

    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn policy(&self) -> &ClusterPolicy {
        &self.policy
    }

    /// Load the config at `config_path` (if any), identify, and write the refreshed config back.
    ///
    /// A missing or corrupt config is treated as empty. Failing to write it is an error.
    pub fn identify(
        &self,
        scan: &ScanData,
        config_path: Option<&Path>,
        annotator: Option<&mut dyn Annotator>,
    ) -> Result<SystemsReport> {
        let previous = match config_path {
            Some(path) => self.load_previous(path),
            None => ArchitectureConfig::default(),
        };

        let identification = self.identify_with_config(scan, &previous, annotator);

        if let Some(path) = config_path {
            save_config(path, &identification.config)?;
            self.observer.on_event(&Event::ConfigSaved { path });
        }
        Ok(identification.report)
    }

    /// Pure pipeline over an already loaded config. Performs no file I/O.
    pub fn identify_with_config(
        &self,
        scan: &ScanData,
        previous: &ArchitectureConfig,
        annotator: Option<&mut dyn Annotator>,
    ) -> Identification {
        let observer = self.observer.as_ref();
        observer.on_event(&Event::AnalysisStarted {
            files: scan.files.len(),
        });

        let clusters = consolidate(aggregate(&scan.files), &self.policy, observer);
        let edges = infer_dependencies(&clusters);
        observer.on_event(&Event::DependenciesInferred {
            edges: edges.edge_count(),
        });

        let mut systems: BTreeMap<String, System> = clusters
            .iter()
            .map(|(key, cluster)| (key.clone(), cluster_to_system(key, cluster, &edges)))
            .collect();

        apply_persisted(&mut systems, previous);
        let interactive = annotator.map(|annotator| run_interactive(&mut systems, annotator, observer));
        fill_descriptions(&mut systems, &clusters);

        let report = assemble_report(systems, scan);
        observer.on_event(&Event::Completed {
            systems: report.summary.total_systems,
            files: report.summary.total_files,
        });

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let config = build_config(&report, previous, &timestamp);
        Identification {
            report,
            config,
            interactive,
        }
    }

    fn load_previous(&self, path: &Path) -> ArchitectureConfig {
        let load = load_config(path);
        match &load {
            ConfigLoad::Loaded(config) => self.observer.on_event(&Event::ConfigLoaded {
                path,
                systems: config.systems.len(),
            }),
            ConfigLoad::Missing => self.observer.on_event(&Event::ConfigMissing { path }),
            ConfigLoad::Corrupt { error } => {
                self.observer.on_event(&Event::ConfigCorrupt { path, error })
            }
        }
        load.into_config()
    }
}

fn cluster_to_system(key: &str, cluster: &SystemCluster, edges: &DependencyEdges) -> System {
    System {
        name: display_name(key),
        description: String::new(),
        file_count: cluster.file_count(),
        total_lines: cluster.total_lines,
        directories: cluster.directories.iter().cloned().collect(),
        files: cluster.files.iter().cloned().collect(),
        depends_on: edges.depends_on(key).to_vec(),
        imported_by: edges.imported_by(key).to_vec(),
        used_by: Vec::new(),
        business_rules: Vec::new(),
        has_fingerprint: cluster.has_fingerprint,
        user_modified: false,
    }
}

/// Wrap the final systems with summary counters and the scan passthrough.
pub fn assemble_report(systems: BTreeMap<String, System>, scan: &ScanData) -> SystemsReport {
    let summary = Summary {
        total_systems: systems.len(),
        total_files: systems.values().map(|s| s.file_count).sum(),
        total_lines: systems.values().map(|s| s.total_lines).sum(),
        discovery_method: DISCOVERY_METHOD.to_string(),
    };
    SystemsReport {
        systems,
        summary,
        scan_data: ScanInfo {
            root: scan.root.clone(),
            scanned_at: scan.scanned_at.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use archmap_protocol::FileRecord;
    use pretty_assertions::assert_eq;

    fn rec(path: &str, lines: usize, imports: &[&str]) -> FileRecord {
        FileRecord::new(path, lines, imports.iter().map(|s| s.to_string()).collect())
    }

    fn scan(records: Vec<FileRecord>) -> ScanData {
        ScanData::new("/repo", records)
    }

    #[test]
    fn invalid_policy_is_rejected() {
        assert!(matches!(
            SystemIdentifier::new(ClusterPolicy::new(0, 5)),
            Err(SystemsError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn builds_report_with_summary_and_passthrough() {
        let identifier = SystemIdentifier::new(ClusterPolicy::new(2, 10))
            .unwrap()
            .with_observer(NoopObserver);
        let mut input = scan(vec![
            rec("auth/index.ts", 10, &["../billing/api"]),
            rec("auth/session.ts", 5, &[]),
            rec("billing/api.ts", 7, &[]),
            rec("billing/invoice.ts", 3, &[]),
        ]);
        input.scanned_at = Some("2026-10-18T09:00:00".to_string());

        let result = identifier.identify_with_config(&input, &ArchitectureConfig::default(), None);
        let report = &result.report;

        assert_eq!(report.summary.total_systems, 2);
        assert_eq!(report.summary.total_files, 4);
        assert_eq!(report.summary.total_lines, 25);
        assert_eq!(report.summary.discovery_method, DISCOVERY_METHOD);
        assert_eq!(report.scan_data.scanned_at.as_deref(), Some("2026-10-18T09:00:00"));

        let auth = &report.systems["auth"];
        assert_eq!(auth.name, "Auth");
        assert_eq!(auth.description, "Auto-detected from auth");
        assert_eq!(auth.depends_on, vec!["billing".to_string()]);
        assert_eq!(report.systems["billing"].imported_by, vec!["auth".to_string()]);
        assert!(result.interactive.is_none());
        assert_eq!(result.config.systems, report.systems);
    }

    #[test]
    fn empty_scan_produces_empty_report() {
        let identifier = SystemIdentifier::new(ClusterPolicy::default())
            .unwrap()
            .with_observer(NoopObserver);
        let result = identifier.identify_with_config(&scan(Vec::new()), &ArchitectureConfig::default(), None);
        assert!(result.report.systems.is_empty());
        assert_eq!(result.report.summary.total_files, 0);
    }
}
