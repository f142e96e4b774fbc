use crate::cluster::SystemCluster;
use crate::observer::{Event, Observer};
use archmap_protocol::{ArchitectureConfig, System, OTHER_SYSTEM, ROOT_SYSTEM};
use std::collections::BTreeMap;

pub const OTHER_DESCRIPTION: &str = "Miscellaneous files not belonging to a major system";

/// Human-authored fields of a system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub description: String,
    pub used_by: Vec<String>,
    pub business_rules: Vec<String>,
}

impl Annotation {
    pub fn of(system: &System) -> Self {
        Self {
            description: system.description.clone(),
            used_by: system.used_by.clone(),
            business_rules: system.business_rules.clone(),
        }
    }

    /// Parse a comma-separated answer into trimmed, non-empty entries.
    pub fn split_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
            && self.used_by.iter().all(|s| s.trim().is_empty())
            && self.business_rules.iter().all(|s| s.trim().is_empty())
    }

    fn apply_to(self, system: &mut System) {
        system.description = self.description;
        system.used_by = self.used_by;
        system.business_rules = self.business_rules;
    }
}

/// Answer from one prompt round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompted {
    /// Raw answers; blank fields mean "keep what is there"
    Answered(Annotation),
    /// The operator cancelled; no further systems are prompted
    Interrupted,
}

/// Source of human annotations, e.g. an interactive console session.
pub trait Annotator {
    fn annotate(&mut self, key: &str, system: &System, existing: &Annotation) -> Prompted;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractiveOutcome {
    pub prompted: usize,
    pub modified: usize,
    pub interrupted: bool,
}

/// Combine an answer with the existing annotation.
///
/// Non-blank answer fields replace the existing ones. The flag is true when
/// any field of the answer was non-blank.
pub fn resolve_answer(existing: &Annotation, answer: Annotation) -> (Annotation, bool) {
    let description = answer.description.trim().to_string();
    let used_by: Vec<String> = clean_list(answer.used_by);
    let business_rules: Vec<String> = clean_list(answer.business_rules);
    let modified = !description.is_empty() || !used_by.is_empty() || !business_rules.is_empty();

    let resolved = Annotation {
        description: if description.is_empty() {
            existing.description.clone()
        } else {
            description
        },
        used_by: if used_by.is_empty() {
            existing.used_by.clone()
        } else {
            used_by
        },
        business_rules: if business_rules.is_empty() {
            existing.business_rules.clone()
        } else {
            business_rules
        },
    };
    (resolved, modified)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Copy persisted annotations onto freshly computed systems.
///
/// User-modified records win verbatim and keep the flag. Other records only
/// contribute their non-empty fields as defaults. File lists and statistics
/// are never taken from the config.
pub fn apply_persisted(systems: &mut BTreeMap<String, System>, config: &ArchitectureConfig) {
    for (key, system) in systems.iter_mut() {
        let Some(record) = config.systems.get(key) else {
            continue;
        };

        if record.user_modified {
            system.description = record.description.clone();
            system.used_by = record.used_by.clone();
            system.business_rules = record.business_rules.clone();
            system.user_modified = true;
            continue;
        }

        if !record.description.is_empty() {
            system.description = record.description.clone();
        }
        if !record.used_by.is_empty() {
            system.used_by = record.used_by.clone();
        }
        if !record.business_rules.is_empty() {
            system.business_rules = record.business_rules.clone();
        }
        system.user_modified = false;
    }
}

/// Prompt for every system largest-first, skipping `other` and systems a user already annotated.
///
/// Interruption stops the loop; answers gathered so far stay applied.
pub fn run_interactive(
    systems: &mut BTreeMap<String, System>,
    annotator: &mut dyn Annotator,
    observer: &dyn Observer,
) -> InteractiveOutcome {
    let mut order: Vec<(String, usize)> = systems
        .iter()
        .filter(|(key, _)| key.as_str() != OTHER_SYSTEM)
        .map(|(key, system)| (key.clone(), system.file_count))
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut outcome = InteractiveOutcome::default();
    for (idx, (key, _)) in order.iter().enumerate() {
        let Some(system) = systems.get_mut(key) else {
            continue;
        };
        if system.user_modified {
            observer.on_event(&Event::AnnotationSkipped { key });
            continue;
        }

        let existing = Annotation::of(system);
        match annotator.annotate(key, system, &existing) {
            Prompted::Answered(answer) => {
                outcome.prompted += 1;
                let (resolved, modified) = resolve_answer(&existing, answer);
                resolved.apply_to(system);
                if modified {
                    system.user_modified = true;
                    outcome.modified += 1;
                }
            }
            Prompted::Interrupted => {
                observer.on_event(&Event::PromptInterrupted {
                    remaining: order.len() - idx,
                });
                outcome.interrupted = true;
                break;
            }
        }
    }
    outcome
}

/// Give every system without a description a generated one.
///
/// User-modified systems keep whatever the operator wrote, even an empty
/// description.
pub fn fill_descriptions(
    systems: &mut BTreeMap<String, System>,
    clusters: &BTreeMap<String, SystemCluster>,
) {
    for (key, system) in systems.iter_mut() {
        if system.user_modified || !system.description.trim().is_empty() {
            continue;
        }
        system.description = if key == OTHER_SYSTEM {
            OTHER_DESCRIPTION.to_string()
        } else {
            let location = clusters
                .get(key)
                .and_then(SystemCluster::principal_directory)
                .filter(|dir| !dir.is_empty() && *dir != ".")
                .unwrap_or(ROOT_SYSTEM);
            format!("Auto-detected from {location}")
        };
    }
}
