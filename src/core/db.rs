use crate::core::error;
use crate::core::schemas;
use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;

pub fn db_connect(db_path: &str) -> Result<Connection, error::SipataniError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::SipataniError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::SipataniError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::SipataniError::RusqliteError)?;
    Ok(conn)
}

/// Open (creating if needed) the database file and make sure the schema exists.
pub fn open_record_db(db_path: &Path) -> Result<Connection, error::SipataniError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(error::SipataniError::IoError)?;
    }
    let conn = db_connect(&db_path.to_string_lossy())?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Idempotent: creates missing tables, seeds schedule statuses and id floors.
pub fn ensure_schema(conn: &Connection) -> Result<(), error::SipataniError> {
    for ddl in schemas::ALL_SCHEMAS {
        conn.execute(ddl, [])?;
    }
    conn.execute(schemas::STATUS_SEED, [])?;
    seed_sequence_floors(conn)?;
    Ok(())
}

fn seed_sequence_floors(conn: &Connection) -> Result<(), error::SipataniError> {
    // sqlite_sequence exists once any AUTOINCREMENT table has been created.
    for (table, floor) in schemas::SEQUENCE_FLOORS {
        let updated = conn.execute(
            "UPDATE sqlite_sequence SET seq = ?2 WHERE name = ?1 AND seq < ?2",
            params![table, floor],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO sqlite_sequence(name, seq)
                 SELECT ?1, ?2 WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = ?1)",
                params![table, floor],
            )?;
        }
    }
    Ok(())
}
