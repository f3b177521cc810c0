//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cloud: CloudConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoHomeDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = AppPaths::new().ok_or(ConfigError::NoHomeDir)?;
        self.save_to(&paths.config_file)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Bomflow Configuration
# BOM document processing and knowledge base curation

[general]
# Data directory for database and stored uploads
# data_dir = "~/.local/share/bomflow"

[matching]
# Minimum fuzzy score for a candidate to count as matched.
# Scores below this are reported as unmatched (best score retained).
fuzzy_threshold = 0.75

# Relative weight of identifier similarity vs description token overlap.
# The two weights should sum to 1.0.
identifier_weight = 0.4
description_weight = 0.6

[storage]
# Directory name (under the data dir) for workflow-scoped uploads
uploads_dir = "uploads"

[cloud]
# Local directory standing in for a SharePoint/Drive share.
# Batch ingestion scans this directory instead of a real cloud download.
# mirror_dir = "~/bomflow-inbox"

[ui]
# Enable colored output
color = true

# Date format (strftime)
date_format = "%Y-%m-%d %H:%M"
"#
        .to_string()
    }

    fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.matching.fuzzy_threshold) {
            return Err(ConfigError::Invalid(format!(
                "matching.fuzzy_threshold must be in [0, 1], got {}",
                self.matching.fuzzy_threshold
            )));
        }
        let weight_sum = self.matching.identifier_weight + self.matching.description_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "matching weights must sum to 1.0, got {}",
                weight_sum
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Matching thresholds and weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub fuzzy_threshold: f64,
    pub identifier_weight: f64,
    pub description_weight: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.75,
            identifier_weight: 0.4,
            description_weight: 0.6,
        }
    }
}

/// Upload storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub uploads_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: "uploads".to_string(),
        }
    }
}

/// Cloud ingestion settings (local mirror stub).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub mirror_dir: Option<String>,
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.matching.fuzzy_threshold, 0.75);
        assert_eq!(config.storage.uploads_dir, "uploads");
        assert!(config.cloud.mirror_dir.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(
            config.matching.fuzzy_threshold,
            deserialized.matching.fuzzy_threshold
        );
        assert_eq!(config.storage.uploads_dir, deserialized.storage.uploads_dir);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [matching]
            fuzzy_threshold = 0.9
            "#
        )
        .unwrap();

        let path = temp_file.path().to_path_buf();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.matching.fuzzy_threshold, 0.9);
        // Defaults should still work
        assert_eq!(config.matching.description_weight, 0.6);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
            [matching]
            fuzzy_threshold = 1.5
            "#
        )
        .unwrap();

        let path = temp_file.path().to_path_buf();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[matching\nfuzzy_threshold = ").unwrap();

        let path = temp_file.path().to_path_buf();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(&Config::default_config_string()).unwrap();
        assert_eq!(config.matching.fuzzy_threshold, 0.75);
    }
}
