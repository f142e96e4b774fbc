use serde::{Deserialize, Serialize};

/// Size policy applied by the consolidator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterPolicy {
    /// Clusters with fewer files are folded into `other`
    pub min_system_files: usize,

    /// Maximum number of promoted systems (the `other` bucket is not counted)
    pub max_systems: usize,
}

impl Default for ClusterPolicy {
    fn default() -> Self {
        Self {
            min_system_files: 3,
            max_systems: 20,
        }
    }
}

impl ClusterPolicy {
    pub fn new(min_system_files: usize, max_systems: usize) -> Self {
        Self {
            min_system_files,
            max_systems,
        }
    }

    pub fn with_min_system_files(mut self, min_system_files: usize) -> Self {
        self.min_system_files = min_system_files;
        self
    }

    pub fn with_max_systems(mut self, max_systems: usize) -> Self {
        self.max_systems = max_systems;
        self
    }

    /// Validate policy
    pub fn validate(&self) -> Result<(), String> {
        if self.min_system_files == 0 {
            return Err("min_system_files must be > 0".to_string());
        }

        if self.max_systems == 0 {
            return Err("max_systems must be > 0".to_string());
        }

        Ok(())
    }
}
