//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Knobs for a [`NavigationSession`](crate::NavigationSession).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Upper bound for a path node's desired degree. Placement with degree 0
    /// or above this fails with `InvalidDegree`.
    pub max_desired_degree: u32,
    /// File name `FileStore` saves under.
    pub map_file_name: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_desired_degree: 8,
            map_file_name: "anchor_graph.anav".to_string(),
        }
    }
}

impl NavigationConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        if config.max_desired_degree == 0 {
            return Err(Error::Config("max_desired_degree must be at least 1".into()));
        }
        if config.map_file_name.is_empty() {
            return Err(Error::Config("map_file_name must not be empty".into()));
        }
        Ok(config)
    }

    pub fn with_max_desired_degree(mut self, max: u32) -> Self {
        self.max_desired_degree = max;
        self
    }
}
