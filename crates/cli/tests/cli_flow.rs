use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn archmap() -> Command {
    let mut cmd = Command::cargo_bin("archmap").expect("binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_project(root: &Path) {
    write(
        root,
        "src/auth/index.ts",
        "import { request } from '../api/client';\nexport * from './session';\n",
    );
    write(root, "src/auth/session.ts", "export const session = {};\n");
    write(root, "src/auth/token.ts", "export const token = 1;\n");
    write(root, "src/api/client.ts", "import axios from 'axios';\nexport const request = axios;\n");
    write(root, "src/api/routes.ts", "export const routes = [];\n");
    write(root, "src/api/types.ts", "export type Route = string;\n");
    write(root, "README.md", "# sample\n");
    write(root, "node_modules/axios/index.js", "module.exports = {};\n");
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn scan_identify_and_docs_pipeline() {
    let project = tempdir().unwrap();
    sample_project(project.path());
    let work = tempdir().unwrap();
    let scan_path = work.path().join("scan.json");
    let systems_path = work.path().join("systems.json");
    let docs_dir = work.path().join("docs");

    archmap()
        .arg("scan")
        .arg(project.path())
        .arg("-o")
        .arg(&scan_path)
        .assert()
        .success();
    let scan = read_json(&scan_path);
    assert_eq!(scan["summary"]["total_files"], 7);
    assert!(scan["files"]
        .as_array()
        .unwrap()
        .iter()
        .all(|f| !f["path"].as_str().unwrap().starts_with("node_modules")));

    archmap()
        .arg("identify")
        .arg(&scan_path)
        .arg(&systems_path)
        .assert()
        .success();
    let report = read_json(&systems_path);
    let systems = report["systems"].as_object().unwrap();
    assert_eq!(systems["auth"]["file_count"], 3);
    assert_eq!(systems["api"]["file_count"], 3);
    assert_eq!(systems["other"]["files"], serde_json::json!(["README.md"]));
    assert_eq!(systems["auth"]["depends_on"], serde_json::json!(["api"]));
    assert_eq!(systems["api"]["imported_by"], serde_json::json!(["auth"]));
    assert_eq!(report["summary"]["total_files"], 7);
    assert!(project.path().join("architecture-config.json").is_file());

    archmap()
        .arg("docs")
        .arg(&systems_path)
        .arg("--out-dir")
        .arg(&docs_dir)
        .assert()
        .success();
    let overview = fs::read_to_string(docs_dir.join("OVERVIEW.md")).unwrap();
    assert!(overview.contains("- [Auth](systems/auth.md)"));
    assert!(docs_dir.join("systems/api.md").is_file());
    assert!(!docs_dir.join("systems/other.md").exists());
    let map = fs::read_to_string(docs_dir.join("diagrams/dependency-map.mmd")).unwrap();
    assert!(map.contains("AUTH -.-> API"));
}

#[test]
fn identify_reads_stdin_and_skips_config() {
    let work = tempdir().unwrap();
    let root = work.path().to_string_lossy().to_string();
    let scan = serde_json::json!({
        "root": root,
        "files": [
            {"path": "billing/invoice.ts", "lines": 10, "imports": []},
            {"path": "billing/tax.ts", "lines": 5, "imports": []},
            {"path": "misc.ts", "lines": 1, "imports": []}
        ]
    });

    let output = archmap()
        .args(["identify", "-", "--no-config", "--min-files", "2"])
        .write_stdin(scan.to_string())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["systems"]["billing"]["total_lines"], 15);
    assert_eq!(report["systems"]["other"]["files"], serde_json::json!(["misc.ts"]));
    assert_eq!(report["summary"]["discovery_method"], "bottom_up_partition");
    assert!(!work.path().join("architecture-config.json").exists());
}

#[test]
fn interactive_without_terminal_still_completes() {
    let project = tempdir().unwrap();
    sample_project(project.path());
    let work = tempdir().unwrap();
    let scan_path = work.path().join("scan.json");
    let config_path = work.path().join("arch.json");

    archmap()
        .args(["--quiet", "scan"])
        .arg(project.path())
        .arg("--output")
        .arg(&scan_path)
        .assert()
        .success();

    archmap()
        .arg("identify")
        .arg(&scan_path)
        .arg("--interactive")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"auth\""));

    let config = read_json(&config_path);
    assert_eq!(config["version"], "3.0");
    assert_eq!(config["systems"]["auth"]["user_modified"], false);
}

#[test]
fn map_writes_systems_json_and_docs() {
    let project = tempdir().unwrap();
    sample_project(project.path());
    let out = tempdir().unwrap();

    archmap()
        .arg("map")
        .arg(project.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("--exclude")
        .arg("src/api")
        .arg("--no-config")
        .assert()
        .success();

    let report = read_json(&out.path().join("systems.json"));
    assert!(report["systems"].get("api").is_none());
    assert_eq!(report["systems"]["auth"]["file_count"], 3);
    assert!(out.path().join("OVERVIEW.md").is_file());
    assert!(out.path().join("diagrams/system-overview.mmd").is_file());
}

#[test]
fn map_rerun_ignores_its_own_outputs() {
    let project = tempdir().unwrap();
    sample_project(project.path());
    write(project.path(), "src/other/legacy.ts", "export const legacy = 1;\n");

    let systems_json = |run: &str| {
        archmap()
            .current_dir(project.path())
            .args(["-q", "map", "."])
            .assert()
            .success();
        let path = project.path().join("docs/architecture/systems.json");
        let mut report = read_json(&path);
        report["scan_data"]
            .as_object_mut()
            .unwrap()
            .remove("scanned_at")
            .unwrap_or_else(|| panic!("{run} run has no scan timestamp"));
        report
    };

    let first = systems_json("first");
    assert!(project.path().join("architecture-config.json").is_file());
    assert!(project.path().join("docs/architecture/systems/auth.md").is_file());

    let second = systems_json("second");
    assert_eq!(first, second);
    assert_eq!(second["summary"]["total_files"], 8);
    assert_eq!(
        second["systems"]["other"]["files"],
        serde_json::json!(["README.md", "src/other/legacy.ts"])
    );
}

#[test]
fn missing_input_is_a_usage_error() {
    archmap()
        .arg("identify")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn malformed_scan_and_invalid_policy_fail() {
    let work = tempdir().unwrap();
    let bad = work.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();

    archmap()
        .arg("identify")
        .arg(&bad)
        .arg("--no-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load scan data"));

    archmap()
        .args(["identify", "-", "--no-config", "--max-systems", "0"])
        .write_stdin(r#"{"files": []}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_systems must be > 0"));
}
