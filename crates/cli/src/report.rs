use anyhow::{Context, Result};
use archmap_protocol::{System, SystemsReport, OTHER_SYSTEM};
use archmap_systems::display_name;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_KEY_DIRECTORIES: usize = 10;
const MAX_KEY_FILES: usize = 20;

/// Render every document under `out_dir` and return the written paths.
pub fn write_docs(report: &SystemsReport, out_dir: &Path, generated_at: &str) -> Result<Vec<PathBuf>> {
    let systems_dir = out_dir.join("systems");
    let diagrams_dir = out_dir.join("diagrams");
    for dir in [out_dir, systems_dir.as_path(), diagrams_dir.as_path()] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut outputs = vec![(out_dir.join("OVERVIEW.md"), render_overview(report, generated_at))];
    for (key, system) in documented(report) {
        outputs.push((
            systems_dir.join(format!("{key}.md")),
            render_system_doc(system, generated_at),
        ));
    }
    outputs.push((
        diagrams_dir.join("system-overview.mmd"),
        render_system_overview(report),
    ));
    outputs.push((
        diagrams_dir.join("dependency-map.mmd"),
        render_dependency_map(report),
    ));

    let mut written = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Created {}", path.display());
        written.push(path);
    }
    Ok(written)
}

pub fn render_overview(report: &SystemsReport, generated_at: &str) -> String {
    let mut md = String::new();
    md.push_str("# Architecture Overview\n\n");
    md.push_str(&format!("> Auto-generated on {generated_at} by archmap\n\n"));

    md.push_str("## System Map\n\n```mermaid\n");
    md.push_str(&render_dependency_map(report));
    md.push_str("```\n\n");

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n|--------|-------|\n");
    md.push_str(&format!("| Total Systems | {} |\n", report.summary.total_systems));
    md.push_str(&format!(
        "| Total Files | {} |\n",
        group_thousands(report.summary.total_files)
    ));
    md.push_str(&format!(
        "| Total Lines | {} |\n\n",
        group_thousands(report.summary.total_lines)
    ));

    md.push_str("## Systems\n\n");
    md.push_str("| System | Files | Lines | Purpose |\n|--------|-------|-------|---------|\n");
    for (key, system) in report.systems_by_size() {
        if key == OTHER_SYSTEM {
            continue;
        }
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            escape_cell(&system.name),
            system.file_count,
            group_thousands(system.total_lines),
            escape_cell(&system.description)
        ));
    }

    md.push_str("\n## Quick Links\n\n");
    for (key, system) in documented(report) {
        md.push_str(&format!("- [{}](systems/{key}.md)\n", system.name));
    }

    md.push_str("\n## Diagrams\n\n");
    md.push_str("- [System Overview](diagrams/system-overview.mmd)\n");
    md.push_str("- [Dependency Map](diagrams/dependency-map.mmd)\n");
    md
}

pub fn render_system_doc(system: &System, generated_on: &str) -> String {
    let badge = if system.has_fingerprint {
        "✅ Core System"
    } else {
        "📁 Directory Group"
    };

    let mut md = String::new();
    md.push_str(&format!("# {} System\n\n", system.name));
    md.push_str(&format!("> Last Updated: {generated_on} | {badge}\n\n"));

    md.push_str("## Overview\n\n");
    if system.description.trim().is_empty() {
        md.push_str("No description available.\n");
    } else {
        md.push_str(&format!("{}\n", system.description));
    }
    if !system.used_by.is_empty() {
        md.push_str(&format!("\n**Consumers:** {}\n", system.used_by.join(", ")));
    }

    if !system.business_rules.is_empty() {
        md.push_str("\n## ⚠️ Business Rules\n\n");
        for rule in &system.business_rules {
            md.push_str(&format!("> **{rule}**\n>\n"));
        }
    }

    md.push_str("\n## Statistics\n\n");
    md.push_str("| Metric | Value |\n|--------|-------|\n");
    md.push_str(&format!("| Files | {} |\n", system.file_count));
    md.push_str(&format!(
        "| Lines of Code | {} |\n",
        group_thousands(system.total_lines)
    ));
    md.push_str(&format!("| Directories | {} |\n", system.directories.len()));

    md.push_str("\n## Dependencies\n\n");
    md.push_str(&format!("**Depends On:** {}\n\n", system_links(&system.depends_on)));
    md.push_str(&format!("**Used By:** {}\n", system_links(&system.imported_by)));

    md.push_str("\n## Key Directories\n\n");
    let mut directories: Vec<&String> = system.directories.iter().collect();
    directories.sort();
    for dir in directories.into_iter().take(MAX_KEY_DIRECTORIES) {
        md.push_str(&format!("- `{dir}/`\n"));
    }

    md.push_str("\n## Key Files\n\n| File |\n|------|\n");
    for file in system.files.iter().take(MAX_KEY_FILES) {
        md.push_str(&format!("| `{file}` |\n"));
    }
    if system.file_count > MAX_KEY_FILES {
        md.push_str(&format!(
            "\n*...and {} more files*\n",
            system.file_count - MAX_KEY_FILES
        ));
    }

    md.push_str("\n## Notes\n\n");
    md.push_str("<!-- Add any manual notes about this system here -->\n");
    md.push_str("- Architecture decisions\n- Known issues\n- Future improvements\n");
    md
}

/// Fingerprinted systems as core, everything else as features.
pub fn render_system_overview(report: &SystemsReport) -> String {
    let ids = mermaid_ids(report);
    let (core, features): (Vec<_>, Vec<_>) =
        documented(report).partition(|(_, system)| system.has_fingerprint);

    let mut lines = vec!["graph TB".to_string()];
    for (title, group) in [
        ("Core[\"⚙️ Core Systems\"]", &core),
        ("Features[\"🎯 Features\"]", &features),
    ] {
        if group.is_empty() {
            continue;
        }
        lines.push(format!("    subgraph {title}"));
        for (key, system) in group {
            lines.push(format!("        {}[\"{}\"]", ids[key.as_str()], label(&system.name)));
        }
        lines.push("    end".to_string());
    }

    lines.extend(dependency_arrows(report, &ids, "-->"));

    if !core.is_empty() || !features.is_empty() {
        lines.push(String::new());
    }
    for (key, _) in &core {
        lines.push(format!("    style {} fill:#ffd93d", ids[key.as_str()]));
    }
    for (key, _) in &features {
        lines.push(format!("    style {} fill:#6bcf7f", ids[key.as_str()]));
    }
    finish(lines)
}

/// Node per system labelled with its size, dotted dependency arrows, colour by size.
pub fn render_dependency_map(report: &SystemsReport) -> String {
    let ids = mermaid_ids(report);
    let mut lines = vec!["graph TD".to_string()];
    for (key, system) in documented(report) {
        lines.push(format!(
            "    {}[\"{}<br/>{} files\"]",
            ids[key.as_str()],
            label(&system.name),
            system.file_count
        ));
    }

    lines.extend(dependency_arrows(report, &ids, "-.->"));

    for (key, system) in documented(report) {
        let fill = match system.file_count {
            n if n > 20 => "#ff6b6b",
            n if n > 10 => "#ffd93d",
            _ => "#6bcf7f",
        };
        lines.push(format!("    style {} fill:{fill}", ids[key.as_str()]));
    }
    finish(lines)
}

/// Uppercased key with every non-alphanumeric character replaced by `_`.
pub fn mermaid_id(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Node id per documented system. Keys that sanitize to the same id get a
/// numeric suffix in key order.
fn mermaid_ids(report: &SystemsReport) -> BTreeMap<&str, String> {
    let mut taken = BTreeSet::new();
    let mut ids = BTreeMap::new();
    for (key, _) in documented(report) {
        let base = mermaid_id(key);
        let mut id = base.clone();
        let mut suffix = 2;
        while taken.contains(&id) {
            id = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(id.clone());
        ids.insert(key.as_str(), id);
    }
    ids
}

fn documented(report: &SystemsReport) -> impl Iterator<Item = (&String, &System)> {
    report
        .systems
        .iter()
        .filter(|(key, _)| key.as_str() != OTHER_SYSTEM)
}

fn dependency_arrows(report: &SystemsReport, ids: &BTreeMap<&str, String>, arrow: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, system) in documented(report) {
        for dep in &system.depends_on {
            if let Some(target) = ids.get(dep.as_str()) {
                lines.push(format!("    {} {arrow} {target}", ids[key.as_str()]));
            }
        }
    }
    lines
}

fn system_links(keys: &[String]) -> String {
    let links: Vec<String> = keys
        .iter()
        .map(|key| {
            if key == OTHER_SYSTEM {
                display_name(key)
            } else {
                format!("[{}]({key}.md)", display_name(key))
            }
        })
        .collect();
    if links.is_empty() {
        "None".to_string()
    } else {
        links.join(", ")
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn label(name: &str) -> String {
    name.replace('"', "'")
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
