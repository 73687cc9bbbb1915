//! Ledger configuration.
//!
//! Loaded from `~/.chitti/config.json` (or an explicit path), then
//! overridden by environment variables:
//!
//! ```bash
//! CHITTI_SURCHARGE_AMOUNT=2000        # charge added to each lottery winner
//! CHITTI_MAX_CONFLICT_RETRIES=3       # optimistic update retries
//! CHITTI_DATA_FILE=/srv/chitti.json   # local ledger document
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SURCHARGE_AMOUNT: i64 = 2000;
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Surcharge amount must be positive, got {0}")]
    NonPositiveSurcharge(i64),
    #[error("No home directory available")]
    NoHomeDir,
}

/// Ledger settings stored in ~/.chitti/config.json
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Extra charge recorded against each lottery winner.
    #[serde(default = "default_surcharge_amount")]
    pub surcharge_amount: i64,
    /// How many times a read-modify-write is retried after a version conflict.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
    /// Local ledger document; `None` means `~/.chitti/ledger.json`.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

fn default_surcharge_amount() -> i64 {
    DEFAULT_SURCHARGE_AMOUNT
}

fn default_max_conflict_retries() -> u32 {
    DEFAULT_MAX_CONFLICT_RETRIES
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            surcharge_amount: DEFAULT_SURCHARGE_AMOUNT,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            data_file: None,
        }
    }
}

impl LedgerConfig {
    /// Load config from custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read(e)
            }
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when the file is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from(path) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Save config to custom path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self)?)?;
        Ok(())
    }

    /// Get default config path (~/.chitti/config.json)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".chitti").join("config.json"))
            .ok_or(ConfigError::NoHomeDir)
    }

    /// Apply `CHITTI_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable source (the process environment in
    /// production, a map in tests).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("CHITTI_SURCHARGE_AMOUNT") {
            self.surcharge_amount = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CHITTI_SURCHARGE_AMOUNT",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("CHITTI_MAX_CONFLICT_RETRIES") {
            self.max_conflict_retries =
                v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "CHITTI_MAX_CONFLICT_RETRIES",
                    value: v.clone(),
                })?;
        }
        if let Some(v) = lookup("CHITTI_DATA_FILE") {
            if !v.trim().is_empty() {
                self.data_file = Some(PathBuf::from(v.trim()));
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.surcharge_amount <= 0 {
            return Err(ConfigError::NonPositiveSurcharge(self.surcharge_amount));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.surcharge_amount, 2000);
        assert_eq!(config.max_conflict_retries, 3);
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = LedgerConfig {
            surcharge_amount: 2500,
            max_conflict_retries: 5,
            data_file: Some(PathBuf::from("/tmp/ledger.json")),
        };

        config.save_to(&path).unwrap();
        let loaded = LedgerConfig::load_from(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"surcharge_amount": 1500}}"#).unwrap();

        let config = LedgerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.surcharge_amount, 1500);
        assert_eq!(config.max_conflict_retries, DEFAULT_MAX_CONFLICT_RETRIES);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            LedgerConfig::load_from(&path),
            Err(ConfigError::NotFound(_))
        ));
        assert_eq!(
            LedgerConfig::load_or_default(&path).unwrap(),
            LedgerConfig::default()
        );
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            LedgerConfig::load_from(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = LedgerConfig::default()
            .with_overrides(vars(&[
                ("CHITTI_SURCHARGE_AMOUNT", "3000"),
                ("CHITTI_MAX_CONFLICT_RETRIES", "7"),
                ("CHITTI_DATA_FILE", "/data/ledger.json"),
            ]))
            .unwrap();
        assert_eq!(config.surcharge_amount, 3000);
        assert_eq!(config.max_conflict_retries, 7);
        assert_eq!(config.data_file, Some(PathBuf::from("/data/ledger.json")));
    }

    #[test]
    fn test_invalid_override() {
        let err = LedgerConfig::default()
            .with_overrides(vars(&[("CHITTI_SURCHARGE_AMOUNT", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("CHITTI_SURCHARGE_AMOUNT"));
    }

    #[test]
    fn test_non_positive_surcharge_rejected() {
        let err = LedgerConfig::default()
            .with_overrides(vars(&[("CHITTI_SURCHARGE_AMOUNT", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveSurcharge(0)));
    }
}
