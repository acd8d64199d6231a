use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

pub const CONFIG_ENV: &str = "POOL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "pool_config.json";

/// Typed application configuration.
///
/// Loaded once at startup. A missing or malformed file is a fatal
/// configuration error; there is no silent empty-config fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub schema_path: PathBuf,
    pub roster_path: PathBuf,
    pub allowlist_path: PathBuf,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Resolve the config file path from `POOL_CONFIG`, falling back to
    /// `pool_config.json` in the working directory.
    pub fn resolve_path() -> PathBuf {
        match env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn load(path: &Path) -> PoolResult<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            PoolError::Configuration(format!("read config {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
            .map_err(|err| PoolError::Configuration(format!("parse config {}: {err}", path.display())))
    }

    fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn parses_complete_config() {
        let raw = r#"{
            "database_path": "pool.db",
            "schema_path": "data/tables_definition.json",
            "roster_path": "data/groups.csv",
            "allowlist_path": "data/allowed_users.csv",
            "export_dir": "exports"
        }"#;
        let config = AppConfig::from_json(raw).expect("config parses");
        assert_eq!(config.database_path.to_str(), Some("pool.db"));
        assert_eq!(config.export_dir.to_str(), Some("exports"));
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = r#"{ "database_path": "pool.db" }"#;
        assert!(AppConfig::from_json(raw).is_err());
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = AppConfig::load(std::path::Path::new("does/not/exist.json"))
            .expect_err("load must fail");
        assert!(matches!(err, crate::error::PoolError::Configuration(_)));
    }
}
