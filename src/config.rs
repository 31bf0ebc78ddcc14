use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;

use crate::error::DatadepsError;

/// Complete datadeps configuration (loaded from TOML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatadepsConfig {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Where timestamped data directories live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Data root, relative to the directory holding the config file
    #[serde(default = "default_data_root")]
    pub root: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
        }
    }
}

/// Which files take part in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns relative to the project root
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            patterns: default_patterns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Compression method: deflated, stored
    #[serde(default = "default_compression")]
    pub compression: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression: default_compression(),
        }
    }
}

fn default_data_root() -> String {
    "data".to_string()
}

fn default_patterns() -> Vec<String> {
    vec!["*.py".to_string()]
}

fn default_compression() -> String {
    "deflated".to_string()
}

impl DatadepsConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: DatadepsConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Generate example configuration as TOML string
    pub fn example() -> String {
        let config = DatadepsConfig {
            data: DataConfig {
                root: "data".to_string(),
            },
            scan: ScanConfig {
                patterns: vec!["*.py".to_string(), "scripts/**/*.sh".to_string()],
            },
            archive: ArchiveConfig {
                compression: "deflated".to_string(),
            },
        };

        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.data.root.trim().is_empty() {
            return Err(DatadepsError::InvalidConfig("data.root must not be empty".into()).into());
        }

        if self.scan.patterns.is_empty() {
            return Err(
                DatadepsError::InvalidConfig("scan.patterns must not be empty".into()).into(),
            );
        }

        for pattern in &self.scan.patterns {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid scan pattern: {}", pattern))?;
        }

        self.compression_method()?;
        Ok(())
    }

    /// Parsed archive compression method
    pub fn compression_method(&self) -> Result<CompressionMethod> {
        match self.archive.compression.as_str() {
            "deflated" => Ok(CompressionMethod::Deflated),
            "stored" => Ok(CompressionMethod::Stored),
            other => Err(DatadepsError::InvalidConfig(format!(
                "Invalid compression: {}. Must be one of: deflated, stored",
                other
            ))
            .into()),
        }
    }

    /// Data root resolved against `base_dir` when relative
    pub fn data_root(&self, base_dir: &Path) -> PathBuf {
        let root = Path::new(&self.data.root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            base_dir.join(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DatadepsConfig::default();
        assert_eq!(config.data.root, "data");
        assert_eq!(config.scan.patterns, vec!["*.py"]);
        assert_eq!(config.archive.compression, "deflated");
    }

    #[test]
    fn test_validate_config() {
        let config = DatadepsConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_compression() {
        let mut config = DatadepsConfig::default();
        config.archive.compression = "bzip9".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_patterns() {
        let mut config = DatadepsConfig::default();
        config.scan.patterns.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_round_trips() {
        let config: DatadepsConfig = toml::from_str(&DatadepsConfig::example()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.patterns.len(), 2);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("datadeps.toml");
        fs::write(&path, "[data]\nroot = \"/srv/data\"\n").unwrap();

        let config = DatadepsConfig::from_file(&path).unwrap();
        assert_eq!(config.data_root(temp.path()), PathBuf::from("/srv/data"));
        assert_eq!(config.scan.patterns, vec!["*.py"]);
        assert_eq!(
            config.compression_method().unwrap(),
            CompressionMethod::Deflated
        );
    }

    #[test]
    fn test_relative_data_root() {
        let config = DatadepsConfig::default();
        assert_eq!(
            config.data_root(Path::new("/project")),
            PathBuf::from("/project/data")
        );
    }
}
