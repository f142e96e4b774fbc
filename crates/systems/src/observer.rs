use crate::consolidate::FoldReason;
use std::path::Path;

/// Progress and status events emitted by the identification engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    AnalysisStarted {
        files: usize,
    },
    ClusterPromoted {
        key: &'a str,
        file_count: usize,
    },
    ClusterFolded {
        key: &'a str,
        file_count: usize,
        reason: FoldReason,
    },
    DependenciesInferred {
        edges: usize,
    },
    ConfigLoaded {
        path: &'a Path,
        systems: usize,
    },
    ConfigMissing {
        path: &'a Path,
    },
    ConfigCorrupt {
        path: &'a Path,
        error: &'a str,
    },
    AnnotationSkipped {
        key: &'a str,
    },
    PromptInterrupted {
        remaining: usize,
    },
    ConfigSaved {
        path: &'a Path,
    },
    Completed {
        systems: usize,
        files: usize,
    },
}

/// Sink for engine events. The engine never writes to an output channel itself.
pub trait Observer {
    fn on_event(&self, event: &Event<'_>);
}

impl<F> Observer for F
where
    F: Fn(&Event<'_>),
{
    fn on_event(&self, event: &Event<'_>) {
        self(event)
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_event(&self, event: &Event<'_>) {
        match event {
            Event::AnalysisStarted { files } => {
                log::info!("Analyzing {files} files");
            }
            Event::ClusterPromoted { key, file_count } => {
                log::info!("System {key} ({file_count} files)");
            }
            Event::ClusterFolded {
                key,
                file_count,
                reason,
            } => {
                log::debug!(
                    "Folding {key} ({file_count} files) into other: {}",
                    reason.as_str()
                );
            }
            Event::DependenciesInferred { edges } => {
                log::debug!("Inferred {edges} dependency edges");
            }
            Event::ConfigLoaded { path, systems } => {
                log::info!(
                    "Loaded config {} ({systems} systems)",
                    path.display()
                );
            }
            Event::ConfigMissing { path } => {
                log::debug!("No config at {}, starting fresh", path.display());
            }
            Event::ConfigCorrupt { path, error } => {
                log::warn!(
                    "Ignoring unreadable config {}: {error}",
                    path.display()
                );
            }
            Event::AnnotationSkipped { key } => {
                log::info!("Skipping {key} (already configured)");
            }
            Event::PromptInterrupted { remaining } => {
                log::warn!("Prompt interrupted, skipping {remaining} remaining systems");
            }
            Event::ConfigSaved { path } => {
                log::info!("Config saved to {}", path.display());
            }
            Event::Completed { systems, files } => {
                log::info!("Discovered {systems} systems covering {files} files");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _event: &Event<'_>) {}
}
