//! Workspace configuration.

use serde::{Deserialize, Serialize};

/// Destination for derived files.
///
/// An empty directory means derived files are written next to their input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace directory (possibly empty)
    #[serde(rename = "workspace_path", default)]
    pub directory: String,
}

impl WorkspaceConfig {
    /// Create a config pointing at `directory`.
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Whether derived files go next to their inputs.
    pub fn is_unset(&self) -> bool {
        self.directory.trim().is_empty()
    }

    /// The directory, or an empty string when unset.
    pub fn directory(&self) -> &str {
        if self.is_unset() {
            ""
        } else {
            &self.directory
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_name() {
        let config = WorkspaceConfig::new("/work");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"workspace_path":"/work"}"#);

        let parsed: WorkspaceConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_unset());
    }

    #[test]
    fn test_blank_directory_is_unset() {
        let config = WorkspaceConfig::new("   ");
        assert!(config.is_unset());
        assert_eq!(config.directory(), "");
    }
}
