//! Generated-id sequences.
//!
//! Ids are issued by SQLite itself (`AUTOINCREMENT`), so two writers can never
//! be handed the same id and a deleted id is never reissued. This module only
//! describes the sequences and answers "what will the next id be" for display.

use crate::core::error::SipataniError;
use crate::core::schemas;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sequence {
    Farmer,
    Land,
    Plant,
    Schedule,
    FertilizationActivity,
    Stock,
    Harvest,
    CropIssue,
    Report,
}

impl Sequence {
    pub fn table(self) -> &'static str {
        match self {
            Sequence::Farmer => schemas::TABLE_FARMER,
            Sequence::Land => schemas::TABLE_LAND,
            Sequence::Plant => schemas::TABLE_PLANT,
            Sequence::Schedule => schemas::TABLE_SCHEDULE,
            Sequence::FertilizationActivity => schemas::TABLE_FERTILIZATION,
            Sequence::Stock => schemas::TABLE_STOCK,
            Sequence::Harvest => schemas::TABLE_HARVEST,
            Sequence::CropIssue => schemas::TABLE_CROP_ISSUE,
            Sequence::Report => schemas::TABLE_REPORT,
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            Sequence::Farmer => "id_petani",
            Sequence::Land => "id_lahan",
            Sequence::Plant => "id_tanaman",
            Sequence::Schedule => "id_jadwal_tanam",
            Sequence::FertilizationActivity => "id_kegiatan",
            Sequence::Stock => "id_pupukpestisida",
            Sequence::Harvest => "id_panen",
            Sequence::CropIssue => "id_masalah",
            Sequence::Report => "id",
        }
    }

    /// The id before the first one the table issues.
    pub fn floor(self) -> i64 {
        schemas::SEQUENCE_FLOORS
            .iter()
            .find(|(table, _)| *table == self.table())
            .map(|(_, floor)| *floor)
            .unwrap_or(0)
    }
}

/// The id the next insert into `seq`'s table will receive.
///
/// This is `max(highest id ever issued, current max id, floor) + 1`, which is
/// exactly what `AUTOINCREMENT` will pick. It is informational only; callers
/// must use the id returned by the insert itself.
pub fn peek_next_id(conn: &Connection, seq: Sequence) -> Result<i64, SipataniError> {
    let issued: Option<i64> = conn
        .query_row(
            "SELECT seq FROM sqlite_sequence WHERE name = ?1",
            params![seq.table()],
            |row| row.get(0),
        )
        .optional()?;
    let current_max: Option<i64> = conn.query_row(
        &format!("SELECT MAX({}) FROM {}", seq.id_column(), seq.table()),
        [],
        |row| row.get(0),
    )?;

    let high = [issued, current_max, Some(seq.floor())]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0);
    Ok(high + 1)
}
