use crate::core::db;
use crate::core::error;
use crate::core::output::TableRow;
use crate::core::store::Store;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;

/// The DB Broker is the single entry point for store access from the CLI.
///
/// It opens one connection per operation, hands it to the operation
/// explicitly, and appends the outcome to the audit log. The connection is
/// dropped on every exit path, which also rolls back any transaction the
/// operation left uncommitted.
pub struct DbBroker<'a> {
    store: &'a Store,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableRow for BrokerEvent {
    fn headers() -> Vec<&'static str> {
        vec!["Time", "Event", "Actor", "Operation", "Status", "Error"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.ts.clone(),
            self.event_id.clone(),
            self.actor.clone(),
            self.op.clone(),
            self.status.clone(),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

impl<'a> DbBroker<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Execute a closure with a fresh connection to the record database.
    pub fn with_conn<F, R>(&self, op_name: &str, f: F) -> Result<R, error::SipataniError>
    where
        F: FnOnce(&mut Connection) -> Result<R, error::SipataniError>,
    {
        let mut conn = db::open_record_db(&self.store.db_path)?;
        let result = f(&mut conn);
        drop(conn);

        match &result {
            Ok(_) => tracing::debug!(op = op_name, "operation succeeded"),
            Err(e) => tracing::warn!(op = op_name, error = %e, "operation failed"),
        }
        self.log_event(op_name, result.as_ref().err())?;
        result
    }

    /// Like [`with_conn`](Self::with_conn) but never written to the audit log.
    pub fn read<F, R>(&self, f: F) -> Result<R, error::SipataniError>
    where
        F: FnOnce(&Connection) -> Result<R, error::SipataniError>,
    {
        let conn = db::open_record_db(&self.store.db_path)?;
        f(&conn)
    }

    fn log_event(
        &self,
        op: &str,
        err: Option<&error::SipataniError>,
    ) -> Result<(), error::SipataniError> {
        if !self.store.audit_enabled {
            return Ok(());
        }

        let db_id = self
            .store
            .db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let ev = BrokerEvent {
            ts: time::timestamp(),
            event_id: time::event_id(),
            actor: self.store.actor.clone(),
            op: op.to_string(),
            db_id,
            status: if err.is_none() { "success" } else { "error" }.to_string(),
            error: err.map(|e| e.to_string()),
        };

        let line = serde_json::to_string(&ev)
            .map_err(|e| error::SipataniError::IoError(e.into()))?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.store.audit_log_path)
            .map_err(error::SipataniError::IoError)?;
        writeln!(f, "{}", line).map_err(error::SipataniError::IoError)?;
        Ok(())
    }
}

/// Read back every audit event, oldest first. A missing log is empty.
pub fn read_audit_log(store: &Store) -> Result<Vec<BrokerEvent>, error::SipataniError> {
    if !store.audit_log_path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&store.audit_log_path).map_err(error::SipataniError::IoError)?;
    let mut events = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let ev: BrokerEvent = serde_json::from_str(line).map_err(|e| {
            error::SipataniError::ValidationError(format!(
                "audit log line {} is not valid JSON: {}",
                lineno + 1,
                e
            ))
        })?;
        events.push(ev);
    }
    Ok(events)
}
