use crate::core::error::SipataniError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "sipatani.toml";

/// Settings from `sipatani.toml`. Every field has a default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SipataniConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            actor: default_actor(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(schemas::DEFAULT_DB_NAME)
}

fn default_true() -> bool {
    true
}

fn default_actor() -> String {
    "operator".to_string()
}

pub fn parse_config(content: &str) -> Result<SipataniConfig, SipataniError> {
    toml::from_str(content).map_err(|e| SipataniError::ConfigError(e.to_string()))
}

/// Load config from an explicit path, or from `sipatani.toml` in `dir`.
///
/// An explicit path must exist. Without one, a missing file means defaults.
/// A relative `database.path` is resolved against the config file's directory.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<SipataniConfig, SipataniError> {
    let config_path = match explicit {
        Some(p) => {
            if !p.exists() {
                return Err(SipataniError::ConfigError(format!(
                    "config file {} does not exist",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if !candidate.exists() {
                return Ok(SipataniConfig::default());
            }
            candidate
        }
    };

    let content = fs::read_to_string(&config_path).map_err(SipataniError::IoError)?;
    let mut config = parse_config(&content)?;
    if config.database.path.is_relative() {
        if let Some(base) = config_path.parent() {
            config.database.path = base.join(&config.database.path);
        }
    }
    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}
