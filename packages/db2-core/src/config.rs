//! Data loading configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::locale::Locale;

/// Record that must exist for the loaded data to be considered current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCheck {
    /// Table name, e.g. "AreaTable"
    pub table: String,
    /// Last record ID known to ship with the supported client build
    pub record_id: u32,
}

impl VersionCheck {
    pub fn new(table: impl Into<String>, record_id: u32) -> Self {
        Self {
            table: table.into(),
            record_id,
        }
    }
}

/// Data loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory containing `dbc/` and `gt/` (default: "./data")
    pub data_dir: PathBuf,
    /// Locale whose directory must exist and provides the base rows (default: enUS)
    pub default_locale: Locale,
    /// Maximum concurrent table loads (default: 20)
    pub load_workers: usize,
    /// Optional JSON hotfix store
    pub hotfix_path: Option<PathBuf>,
    /// Whether `gt/*.txt` game tables are loaded (default: true)
    pub load_game_tables: bool,
    /// Last known records per critical table
    pub version_checks: Vec<VersionCheck>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            default_locale: Locale::EnUs,
            load_workers: 20,
            hotfix_path: None,
            load_game_tables: true,
            version_checks: vec![
                VersionCheck::new("AreaTable", 15_543),
                VersionCheck::new("CurvePoint", 1_029_826),
                VersionCheck::new("ItemBonus", 104_417),
                VersionCheck::new("Map", 2_828),
                VersionCheck::new("UiMapAssignment", 46_937),
            ],
        }
    }
}

impl DataConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration rooted at `data_dir` with every other value defaulted.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DataError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| DataError::Config(format!("Invalid TOML: {}", e)))
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| DataError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), toml)
            .map_err(|e| DataError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Applies environment variable overrides.
    /// Environment variables are prefixed with `DB2_`.
    /// Example: `DB2_DATA_DIR=/path` overrides `data_dir`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("DB2_DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = env::var("DB2_DEFAULT_LOCALE") {
            self.default_locale = val
                .parse()
                .map_err(|e| DataError::Config(format!("Invalid default_locale: {}", e)))?;
        }
        if let Ok(val) = env::var("DB2_LOAD_WORKERS") {
            self.load_workers = val
                .parse()
                .map_err(|_| DataError::Config(format!("Invalid load_workers: {}", val)))?;
        }
        if let Ok(val) = env::var("DB2_HOTFIX_PATH") {
            self.hotfix_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("DB2_LOAD_GAME_TABLES") {
            self.load_game_tables = val
                .parse()
                .map_err(|_| DataError::Config(format!("Invalid load_game_tables: {}", val)))?;
        }
        Ok(())
    }

    /// Directory holding one subdirectory of `.db2` files per locale.
    pub fn dbc_dir(&self) -> PathBuf {
        self.data_dir.join("dbc")
    }

    /// Directory holding `gt/*.txt` game tables.
    pub fn gt_dir(&self) -> PathBuf {
        self.data_dir.join("gt")
    }

    /// Worker count clamped to at least one thread.
    pub fn effective_workers(&self) -> usize {
        self.load_workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = DataConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.default_locale, Locale::EnUs);
        assert_eq!(config.load_workers, 20);
        assert!(config.load_game_tables);
        assert!(!config.version_checks.is_empty());
        assert_eq!(config.dbc_dir(), PathBuf::from("./data/dbc"));
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            data_dir = "/srv/data"
            default_locale = "deDE"
            load_workers = 4
            hotfix_path = "/srv/hotfixes.json"
            load_game_tables = false

            [[version_checks]]
            table = "Map"
            record_id = 2552
        "#;
        let config = DataConfig::from_toml(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.default_locale, Locale::DeDe);
        assert_eq!(config.load_workers, 4);
        assert_eq!(config.hotfix_path, Some(PathBuf::from("/srv/hotfixes.json")));
        assert!(!config.load_game_tables);
        assert_eq!(config.version_checks, vec![VersionCheck::new("Map", 2552)]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DataConfig::from_toml("load_workers = 2").unwrap();
        assert_eq!(config.load_workers, 2);
        assert_eq!(config.default_locale, Locale::EnUs);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            DataConfig::from_toml("load_workers = \"many\""),
            Err(DataError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("db2.toml");
        let mut config = DataConfig::default();
        config.data_dir = PathBuf::from("/test/data");
        config.version_checks.clear();
        config.save_to_file(&file_path).unwrap();
        let loaded = DataConfig::from_file(&file_path).unwrap();
        assert_eq!(loaded.data_dir, PathBuf::from("/test/data"));
        assert!(loaded.version_checks.is_empty());
    }

    #[test]
    fn test_effective_workers() {
        let config = DataConfig {
            load_workers: 0,
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 1);
    }
}
