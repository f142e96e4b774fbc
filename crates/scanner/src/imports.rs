use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static ES_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:import|export)\s+[^'";]*?\s+from\s+['"]([^'"]+)['"]"#).expect("valid regex")
});
static SIDE_EFFECT_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*import\s+['"]([^'"]+)['"]"#).expect("valid regex"));
static DYNAMIC_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex"));
static REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid regex"));

static PY_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*import\s+([\w.]+)").expect("valid regex"));
static PY_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*from\s+([\w.]+)\s+import\b").expect("valid regex"));

static RUST_USE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([\w:]+)").expect("valid regex")
});

static GO_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#).expect("valid regex"));
static GO_IMPORT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\bimport\s*\(([^)]*)\)").expect("valid regex"));
static GO_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));

/// Import specifiers referenced by `content`, sorted and deduplicated.
///
/// `extension` is the file extension without the dot, any case. Unknown
/// extensions have no imports. Matching is textual: imports inside comments
/// or strings are picked up too.
pub fn extract_imports(content: &str, extension: &str) -> Vec<String> {
    let mut found = BTreeSet::new();
    match extension.to_ascii_lowercase().as_str() {
        "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => {
            collect(&ES_IMPORT, content, &mut found);
            collect(&SIDE_EFFECT_IMPORT, content, &mut found);
            collect(&DYNAMIC_IMPORT, content, &mut found);
            collect(&REQUIRE, content, &mut found);
        }
        "vue" | "svelte" => {
            collect(&ES_IMPORT, content, &mut found);
            collect(&DYNAMIC_IMPORT, content, &mut found);
        }
        "py" => {
            collect(&PY_IMPORT, content, &mut found);
            collect(&PY_FROM, content, &mut found);
        }
        "rs" => collect(&RUST_USE, content, &mut found),
        "go" => {
            collect(&GO_IMPORT, content, &mut found);
            for block in GO_IMPORT_BLOCK.captures_iter(content) {
                if let Some(body) = block.get(1) {
                    collect(&GO_QUOTED, body.as_str(), &mut found);
                }
            }
        }
        _ => {}
    }
    found.into_iter().collect()
}

fn collect(pattern: &Regex, content: &str, found: &mut BTreeSet<String>) {
    for captures in pattern.captures_iter(content) {
        if let Some(m) = captures.get(1) {
            let value = m.as_str().trim();
            if !value.is_empty() {
                found.insert(value.to_string());
            }
        }
    }
}
