use archmap_protocol::System;
use archmap_systems::{Annotation, Annotator, Prompted};
use console::{style, Term};
use dialoguer::Input;

const SHOWN_DIRECTORIES: usize = 3;

/// Asks the operator for descriptions, consumers and business rules on stderr.
///
/// Any prompt failure (Ctrl-C, closed terminal, no tty) ends the session.
pub struct ConsoleAnnotator {
    term: Term,
}

impl ConsoleAnnotator {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask(&self, prompt: &str, current: &str) -> dialoguer::Result<String> {
        let prompt = if current.is_empty() {
            prompt.to_string()
        } else {
            format!("{prompt} [{current}]")
        };
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text_on(&self.term)
    }

    fn session(&self, key: &str, system: &System, existing: &Annotation) -> dialoguer::Result<Annotation> {
        self.term.write_line("")?;
        self.term.write_line(&format!(
            "{} {} ({} files, {} lines)",
            style("▶").cyan(),
            style(&system.name).bold(),
            system.file_count,
            system.total_lines
        ))?;
        let mut directories: Vec<&str> = system
            .directories
            .iter()
            .take(SHOWN_DIRECTORIES)
            .map(String::as_str)
            .collect();
        if directories.is_empty() {
            directories.push(key);
        }
        self.term
            .write_line(&style(format!("  {}", directories.join(", "))).dim().to_string())?;

        let description = self.ask("Description", &existing.description)?;
        let used_by = self.ask("Used by (comma separated)", &existing.used_by.join(", "))?;
        let business_rules = self.ask(
            "Business rules (comma separated)",
            &existing.business_rules.join(", "),
        )?;

        Ok(Annotation {
            description,
            used_by: Annotation::split_list(&used_by),
            business_rules: Annotation::split_list(&business_rules),
        })
    }
}

impl Default for ConsoleAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for ConsoleAnnotator {
    fn annotate(&mut self, key: &str, system: &System, existing: &Annotation) -> Prompted {
        match self.session(key, system, existing) {
            Ok(answer) => Prompted::Answered(answer),
            Err(err) => {
                log::debug!("Prompt for {key} ended: {err}");
                Prompted::Interrupted
            }
        }
    }
}
