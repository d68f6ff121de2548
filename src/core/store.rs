//! Store handle: where the record database and its audit log live.

use crate::core::config::SipataniConfig;
use std::path::{Path, PathBuf};

/// Location of one SIPATANI record store.
#[derive(Debug, Clone)]
pub struct Store {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Append-only JSONL mutation log, next to the database.
    pub audit_log_path: PathBuf,
    pub audit_enabled: bool,
    /// Name recorded as the actor in audit events.
    pub actor: String,
}

impl Store {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
            audit_log_path: audit_log_path_for(db_path),
            audit_enabled: true,
            actor: "operator".to_string(),
        }
    }

    /// Build from config, with `--db` taking precedence over `database.path`.
    pub fn from_config(config: &SipataniConfig, db_override: Option<&Path>) -> Self {
        let db_path = db_override.unwrap_or(config.database.path.as_path());
        Self {
            audit_enabled: config.audit.enabled,
            actor: config.audit.actor.clone(),
            ..Self::new(db_path)
        }
    }
}

/// `farm.db` -> `farm.events.jsonl` in the same directory.
pub fn audit_log_path_for(db_path: &Path) -> PathBuf {
    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "sipatani".to_string());
    db_path.with_file_name(format!("{stem}.events.jsonl"))
}
