use crate::Result;
use archmap_protocol::{ArchitectureConfig, SystemsReport, CONFIG_VERSION};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of reading the persisted config. Loading never fails: anything
/// other than a parsable file is treated as an empty config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLoad {
    Loaded(ArchitectureConfig),
    Missing,
    Corrupt { error: String },
}

impl ConfigLoad {
    pub fn into_config(self) -> ArchitectureConfig {
        match self {
            ConfigLoad::Loaded(config) => config,
            ConfigLoad::Missing | ConfigLoad::Corrupt { .. } => ArchitectureConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> ConfigLoad {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return ConfigLoad::Missing,
        Err(err) => {
            return ConfigLoad::Corrupt {
                error: err.to_string(),
            }
        }
    };
    match serde_json::from_slice::<ArchitectureConfig>(&bytes) {
        Ok(config) => ConfigLoad::Loaded(config),
        Err(err) => ConfigLoad::Corrupt {
            error: err.to_string(),
        },
    }
}

pub fn save_config(path: &Path, config: &ArchitectureConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut data = serde_json::to_vec_pretty(config)?;
    data.push(b'\n');
    fs::write(path, data)?;
    Ok(())
}

/// Relative config paths are resolved against the scanned root.
#[must_use]
pub fn resolve_config_path(root: &str, config: &Path) -> PathBuf {
    if config.is_absolute() {
        config.to_path_buf()
    } else {
        Path::new(root).join(config)
    }
}

/// Config to persist after a run.
///
/// Every system of the report is written. User-modified records of systems
/// that did not appear in this run are carried over unchanged so their
/// annotations survive until the system comes back.
pub fn build_config(
    report: &SystemsReport,
    previous: &ArchitectureConfig,
    timestamp: &str,
) -> ArchitectureConfig {
    let mut systems = report.systems.clone();
    for (key, record) in &previous.systems {
        if record.user_modified && !systems.contains_key(key) {
            systems.insert(key.clone(), record.clone());
        }
    }

    ArchitectureConfig {
        version: CONFIG_VERSION.to_string(),
        last_updated: Some(timestamp.to_string()),
        last_scan: Some(timestamp.to_string()),
        root: report.scan_data.root.clone(),
        systems,
    }
}
