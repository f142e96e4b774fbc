use archmap_protocol::ROOT_SYSTEM;

/// Directory names that only group code and never name a system on their own.
pub const GENERIC_CONTAINERS: &[&str] = &[
    "src",
    "app",
    "apps",
    "lib",
    "libs",
    "packages",
    "modules",
    "core",
    "source",
    "main",
    "features",
    "components",
    "pages",
    "internal",
    "pkg",
];

// Synonym -> canonical name. Only names listed here are rewritten.
const SYNONYMS: &[(&str, &str)] = &[
    ("util", "utils"),
    ("utilities", "utils"),
    ("utility", "utils"),
    ("helpers", "utils"),
    ("helper", "utils"),
    ("common", "utils"),
    ("shared", "utils"),
    ("component", "components"),
    ("ui", "components"),
    ("widgets", "components"),
    ("widget", "components"),
    ("apis", "api"),
    ("endpoints", "api"),
    ("rest", "api"),
    ("test", "tests"),
    ("spec", "tests"),
    ("specs", "tests"),
    ("e2e", "tests"),
    ("testing", "tests"),
    ("type", "types"),
    ("typings", "types"),
    ("interfaces", "types"),
    ("@types", "types"),
    ("configs", "config"),
    ("configuration", "config"),
    ("settings", "config"),
    ("conf", "config"),
    ("asset", "assets"),
    ("static", "assets"),
    ("public", "assets"),
    ("images", "assets"),
    ("img", "assets"),
    ("media", "assets"),
    ("style", "styles"),
    ("css", "styles"),
    ("scss", "styles"),
    ("theme", "styles"),
    ("themes", "styles"),
];

/// Derive the candidate system key for one file path.
///
/// Directory segments are walked deepest-first. Hidden segments, generic
/// containers and `__x__` test/mock segments are skipped; a `(group)` segment
/// is unwrapped and wins immediately. The result is lowercase, canonicalized
/// through the synonym table, and never empty.
pub fn derive_system_name(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let mut segments: Vec<&str> = normalized.split('/').collect();
    // last segment is the file name
    segments.pop();
    let dirs: Vec<String> = segments
        .into_iter()
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_lowercase)
        .collect();

    let Some(shallowest) = dirs.first() else {
        return ROOT_SYSTEM.to_string();
    };

    for segment in dirs.iter().rev() {
        if segment.starts_with('.') || is_bracket_segment(segment) {
            continue;
        }
        if let Some(inner) = route_group(segment) {
            return canonical_name(inner);
        }
        if GENERIC_CONTAINERS.contains(&segment.as_str()) {
            continue;
        }
        return canonical_name(segment);
    }

    canonical_name(shallowest)
}

/// Map a lowercase name onto its canonical synonym, if it has one.
pub fn canonical_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(lowered)
}

/// Human-readable name for a system key (`user-profile` -> `User Profile`).
pub fn display_name(key: &str) -> String {
    key.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_bracket_segment(segment: &str) -> bool {
    segment.len() > 4 && segment.starts_with("__") && segment.ends_with("__")
}

fn route_group(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('(')?.strip_suffix(')')?.trim();
    (!inner.is_empty()).then_some(inner)
}
