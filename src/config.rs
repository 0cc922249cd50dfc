//! YAML configuration for keyfind
//!
//! One file describes the mount table of the key database and the search
//! options shared by the CLI and the HTTP server.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! search:
//!   size_limit: 1048576
//!
//! mounts:
//!   - mountpoint: "user:/sw/app"
//!     backend: yaml
//!     path: "/etc/app.yaml"
//!   - mountpoint: "system:/info"
//!     backend: memory
//!     keys:
//!       version: "1.0"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use keydb::{Kdb, KeyDbError, KeyName, MountSpec};
use search::KeySearch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("key database error: {0}")]
    Kdb(#[from] KeyDbError),
}

/// Top-level keyfind configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyfindConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub search: SearchYamlConfig,

    /// Mount table, in mount order
    #[serde(default)]
    pub mounts: Vec<MountSpec>,
}

impl KeyfindConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: KeyfindConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.search.validate()?;

        let mut seen = HashSet::new();
        for mount in &self.mounts {
            let mountpoint = KeyName::parse(&mount.mountpoint)?;
            if !seen.insert(mountpoint.clone()) {
                return Err(ConfigLoadError::Validation(format!(
                    "mountpoint '{mountpoint}' is configured more than once"
                )));
            }
        }

        Ok(())
    }

    /// Open a key database handle with every configured mount.
    pub fn open_kdb(&self) -> Result<Kdb, ConfigLoadError> {
        Ok(Kdb::from_mounts(&self.mounts)?)
    }

    /// Search options derived from the `search` section.
    pub fn key_search(&self) -> KeySearch {
        KeySearch::new().with_size_limit(self.search.size_limit)
    }
}

impl Default for KeyfindConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            search: SearchYamlConfig::default(),
            mounts: Vec::new(),
        }
    }
}

/// Search YAML configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchYamlConfig {
    /// Upper bound on the compiled pattern size, in bytes
    #[serde(default = "default_size_limit")]
    pub size_limit: usize,
}

impl SearchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.size_limit == 0 {
            return Err(ConfigLoadError::Validation(
                "search.size_limit must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchYamlConfig {
    fn default() -> Self {
        Self {
            size_limit: default_size_limit(),
        }
    }
}

pub const DEFAULT_SIZE_LIMIT: usize = 1024 * 1024;

fn default_size_limit() -> usize {
    DEFAULT_SIZE_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use keydb::BackendConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
search:
  size_limit: 4096
mounts:
  - mountpoint: "system:/info"
    backend: memory
    keys:
      version: "1.0"
  - mountpoint: "user:/sw/app"
    backend: yaml
    path: "/nonexistent/app.yaml"
"#;

        let config = KeyfindConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.search.size_limit, 4096);
        assert_eq!(config.mounts.len(), 2);
        assert_eq!(config.mounts[1].backend, BackendConfig::yaml("/nonexistent/app.yaml"));
        assert_eq!(config.key_search().size_limit(), Some(4096));
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = KeyfindConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert!(config.mounts.is_empty());
        assert_eq!(config.search.size_limit, DEFAULT_SIZE_LIMIT);
    }

    #[test]
    fn test_missing_file() {
        let result = KeyfindConfig::from_file("/nonexistent/keyfind.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let result = KeyfindConfig::from_yaml("version: \"2.0\"");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_invalid_mountpoint() {
        let yaml = r#"
version: "1.0"
mounts:
  - mountpoint: "sw/app"
    backend: memory
"#;
        let result = KeyfindConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::Kdb(KeyDbError::InvalidName { .. }))));
    }

    #[test]
    fn test_duplicate_mountpoint() {
        let yaml = r#"
version: "1.0"
mounts:
  - mountpoint: "user:/a"
    backend: memory
  - mountpoint: "user:/a/"
    backend: memory
"#;
        let result = KeyfindConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_zero_size_limit() {
        let yaml = r#"
version: "1.0"
search:
  size_limit: 0
"#;
        let result = KeyfindConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("size_limit"));
    }

    #[test]
    fn test_open_kdb() {
        let yaml = r#"
version: "1.0"
mounts:
  - mountpoint: "system:/info"
    backend: memory
    keys:
      version: "1.0"
"#;
        let kdb = KeyfindConfig::from_yaml(yaml).unwrap().open_kdb().unwrap();
        assert_eq!(kdb.mountpoints(), ["system:/info"]);
    }
}
