//! Import limits and defaults.

use serde::{Deserialize, Serialize};

/// Import configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Maximum document size in bytes (default: 10MB)
    pub max_file_size: usize,
    /// Maximum folder nesting depth (default: 10)
    pub max_depth: usize,
    /// Maximum number of items (requests + folders) (default: 1000)
    pub max_items: usize,
    /// Detection confidence needed to accept a dialect (default: 0.5)
    pub min_confidence: f64,
    /// Name for environments whose source carries none
    pub default_environment_name: String,
    /// Name for collections whose source carries none
    pub default_collection_name: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_depth: 10,
            max_items: 1000,
            min_confidence: 0.5,
            default_environment_name: "Imported Environment".to_string(),
            default_collection_name: "Imported Collection".to_string(),
        }
    }
}

impl ImportConfig {
    /// Whether `content` fits within the size limit.
    #[must_use]
    pub const fn admits_size(&self, content: &str) -> bool {
        content.len() <= self.max_file_size
    }
}
