use archmap_protocol::{ArchitectureConfig, FileRecord, ScanData, System, OTHER_SYSTEM};
use archmap_systems::{
    derive_system_name, load_config, save_config, Annotation, Annotator, ClusterPolicy, ConfigLoad,
    Event, NoopObserver, Prompted, SystemIdentifier,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::rc::Rc;

fn rec(path: &str, lines: usize, imports: &[&str]) -> FileRecord {
    FileRecord::new(path, lines, imports.iter().map(|s| s.to_string()).collect())
}

fn identifier(min: usize, max: usize) -> SystemIdentifier {
    SystemIdentifier::new(ClusterPolicy::new(min, max))
        .unwrap()
        .with_observer(NoopObserver)
}

fn sample_scan() -> ScanData {
    ScanData::new(
        "/repo",
        vec![
            rec("README.md", 40, &[]),
            rec("package.json", 30, &[]),
            rec("src/auth/index.ts", 120, &["../api/client", "react"]),
            rec("src/auth/session.ts", 80, &["@/utils/storage"]),
            rec("src/auth/components/LoginForm.tsx", 60, &["../index"]),
            rec("src/api/client.ts", 90, &["axios", "../utils/retry"]),
            rec("src/api/routes.ts", 45, &[]),
            rec("src/api/types.ts", 20, &[]),
            rec("src/utils/storage.ts", 15, &[]),
            rec("src/helpers/retry.ts", 25, &[]),
            rec("src/helpers/format.ts", 10, &[]),
            rec("src/billing/invoice.ts", 70, &["../api/client"]),
            rec("app/(dashboard)/page.tsx", 33, &["@/auth"]),
            rec("scripts/deploy.sh", 12, &[]),
        ],
    )
}

struct Scripted {
    answers: VecDeque<Prompted>,
}

impl Annotator for Scripted {
    fn annotate(&mut self, _key: &str, _system: &System, _existing: &Annotation) -> Prompted {
        self.answers.pop_front().unwrap_or(Prompted::Interrupted)
    }
}

#[test]
fn output_is_a_partition_that_conserves_lines() {
    let scan = sample_scan();
    let result = identifier(2, 3).identify_with_config(&scan, &ArchitectureConfig::default(), None);
    let report = result.report;

    let mut seen = Vec::new();
    for system in report.systems.values() {
        assert_eq!(system.file_count, system.files.len());
        seen.extend(system.files.iter().cloned());
    }
    let unique: BTreeSet<_> = seen.iter().cloned().collect();
    assert_eq!(unique.len(), seen.len(), "a file appears in two systems");

    let input: BTreeSet<_> = scan.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(unique, input);

    let input_lines: usize = scan.files.iter().map(|f| f.lines).sum();
    let output_lines: usize = report.systems.values().map(|s| s.total_lines).sum();
    assert_eq!(output_lines, input_lines);
    assert_eq!(report.summary.total_lines, input_lines);
    assert_eq!(report.summary.total_files, scan.files.len());
}

#[test]
fn size_policy_is_enforced() {
    let scan = sample_scan();
    for (min, max) in [(1, 1), (2, 3), (3, 20), (5, 2)] {
        let report = identifier(min, max)
            .identify_with_config(&scan, &ArchitectureConfig::default(), None)
            .report;
        let promoted: Vec<_> = report
            .systems
            .iter()
            .filter(|(key, _)| key.as_str() != OTHER_SYSTEM)
            .collect();
        assert!(promoted.len() <= max, "cap {max} exceeded");
        for (key, system) in promoted {
            assert!(
                system.file_count >= min,
                "{key} has {} files, minimum is {min}",
                system.file_count
            );
        }
    }
}

#[test]
fn dependency_relation_is_symmetric() {
    let report = identifier(1, 20)
        .identify_with_config(&sample_scan(), &ArchitectureConfig::default(), None)
        .report;

    assert!(report.systems["auth"].depends_on.contains(&"api".to_string()));
    assert!(report.systems["api"].depends_on.contains(&"utils".to_string()));
    assert!(report.systems["dashboard"].depends_on.contains(&"auth".to_string()));

    for (a, system_a) in &report.systems {
        assert!(!system_a.depends_on.contains(a), "{a} depends on itself");
        for (b, system_b) in &report.systems {
            assert_eq!(
                system_a.depends_on.contains(b),
                system_b.imported_by.contains(a),
                "asymmetric edge between {a} and {b}"
            );
        }
    }
}

#[test]
fn naming_is_idempotent_and_output_is_stable() {
    for record in sample_scan().files {
        assert_eq!(derive_system_name(&record.path), derive_system_name(&record.path));
    }

    let engine = identifier(2, 5);
    let first = engine.identify_with_config(&sample_scan(), &ArchitectureConfig::default(), None);
    let second = engine.identify_with_config(&sample_scan(), &first.config, None);
    assert_eq!(
        serde_json::to_string(&first.report).unwrap(),
        serde_json::to_string(&second.report).unwrap()
    );
    assert_eq!(first.config.systems, second.config.systems);
}

#[test]
fn example_scenario_and_user_override_durability() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("architecture-config.json");
    let engine = identifier(2, 10);

    let scan = ScanData::new(
        "/repo",
        vec![
            rec("a/index.ts", 10, &[]),
            rec("a/helpers.ts", 10, &[]),
            rec("b/x.ts", 10, &[]),
        ],
    );
    let report = engine.identify(&scan, Some(config_path.as_path()), None).unwrap();
    assert_eq!(report.systems.keys().collect::<Vec<_>>(), vec!["a", "other"]);
    assert_eq!(report.systems["a"].file_count, 2);
    assert!(report.systems["a"].has_fingerprint);
    assert_eq!(report.systems["other"].file_count, 1);
    assert_eq!(report.systems["other"].files, vec!["b/x.ts".to_string()]);
    assert!(!report.systems["other"].has_fingerprint);

    // The operator annotates `a` by hand.
    let ConfigLoad::Loaded(mut config) = load_config(&config_path) else {
        panic!("config was not written");
    };
    let a = config.systems.get_mut("a").unwrap();
    a.description = "Hand-written".to_string();
    a.business_rules = vec!["never cache".to_string()];
    a.user_modified = true;
    save_config(&config_path, &config).unwrap();

    // `a` grows; a non-interactive run must not touch the annotation.
    let grown = ScanData::new(
        "/repo",
        vec![
            rec("a/index.ts", 10, &[]),
            rec("a/helpers.ts", 10, &[]),
            rec("a/extra.ts", 5, &[]),
            rec("b/x.ts", 10, &[]),
        ],
    );
    let report = engine.identify(&grown, Some(config_path.as_path()), None).unwrap();
    let a = &report.systems["a"];
    assert_eq!(a.file_count, 3);
    assert_eq!(a.description, "Hand-written");
    assert_eq!(a.business_rules, vec!["never cache".to_string()]);
    assert!(a.user_modified);

    let ConfigLoad::Loaded(saved) = load_config(&config_path) else {
        panic!("config was not rewritten");
    };
    assert_eq!(saved.systems["a"].description, "Hand-written");
    assert_eq!(saved.systems["a"].file_count, 3);
}

#[test]
fn corrupt_config_is_reported_and_replaced() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("architecture-config.json");
    fs::write(&config_path, "garbage").unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let engine = SystemIdentifier::new(ClusterPolicy::new(2, 10))
        .unwrap()
        .with_observer(move |event: &Event<'_>| {
            let tag = match event {
                Event::ConfigCorrupt { .. } => "corrupt",
                Event::ConfigSaved { .. } => "saved",
                _ => return,
            };
            sink.borrow_mut().push(tag);
        });

    let report = engine
        .identify(&sample_scan(), Some(config_path.as_path()), None)
        .unwrap();
    assert!(!report.systems.is_empty());
    assert_eq!(*events.borrow(), vec!["corrupt", "saved"]);
    assert!(matches!(load_config(&config_path), ConfigLoad::Loaded(_)));
}

#[test]
fn interrupted_session_is_still_persisted() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("architecture-config.json");
    let engine = identifier(2, 10);

    let mut annotator = Scripted {
        answers: VecDeque::from(vec![
            Prompted::Answered(Annotation {
                description: "HTTP client and routes".to_string(),
                used_by: vec!["dashboard".to_string()],
                business_rules: Vec::new(),
            }),
            Prompted::Interrupted,
        ]),
    };
    let report = engine
        .identify(&sample_scan(), Some(config_path.as_path()), Some(&mut annotator))
        .unwrap();

    // api, auth and utils tie on size; ties are prompted in key order.
    let api = &report.systems["api"];
    assert!(api.user_modified);
    assert_eq!(api.description, "HTTP client and routes");
    let modified: Vec<_> = report
        .systems
        .iter()
        .filter(|(_, s)| s.user_modified)
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(modified, vec!["api"]);

    let ConfigLoad::Loaded(saved) = load_config(&config_path) else {
        panic!("config was not written");
    };
    assert!(saved.systems["api"].user_modified);
    assert_eq!(saved.systems["api"].used_by, vec!["dashboard".to_string()]);
    assert!(!saved.systems["auth"].user_modified);
}
