//! Closed value sets shared by the record store.
//!
//! Each enum is parsed once at the boundary (`FromStr`, also used as a clap
//! value parser) and stored in the database through `ToSql`/`FromSql`, so no
//! call site compares raw literals.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Planting schedule status, persisted as the integer code of `Status_Jadwal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    InProgress,
    ReadyToHarvest,
}

impl ScheduleStatus {
    pub const ALL: [ScheduleStatus; 3] = [
        ScheduleStatus::Scheduled,
        ScheduleStatus::InProgress,
        ScheduleStatus::ReadyToHarvest,
    ];

    pub fn code(self) -> i64 {
        match self {
            ScheduleStatus::Scheduled => 993,
            ScheduleStatus::InProgress => 994,
            ScheduleStatus::ReadyToHarvest => 995,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Label stored in `Status_Jadwal`.
    pub fn label(self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "Terjadwal",
            ScheduleStatus::InProgress => "Sedang Berlangsung",
            ScheduleStatus::ReadyToHarvest => "Siap Panen",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    /// Accepts the numeric code (`995`) or a name in English or Indonesian.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::from_code(code)
                .ok_or_else(|| format!("unknown status code {code} (expected 993, 994 or 995)"));
        }
        match trimmed.to_lowercase().replace(['-', '_'], " ").as_str() {
            "scheduled" | "terjadwal" => Ok(ScheduleStatus::Scheduled),
            "in progress" | "inprogress" | "sedang berlangsung" => Ok(ScheduleStatus::InProgress),
            "ready to harvest" | "ready" | "siap panen" => Ok(ScheduleStatus::ReadyToHarvest),
            _ => Err(format!("invalid schedule status '{trimmed}'")),
        }
    }
}

impl ToSql for ScheduleStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for ScheduleStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        Self::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

/// Kind of a stock item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockKind {
    #[serde(rename = "Pupuk")]
    Fertilizer,
    #[serde(rename = "Pestisida")]
    Pesticide,
}

impl StockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StockKind::Fertilizer => "Pupuk",
            StockKind::Pesticide => "Pestisida",
        }
    }
}

impl fmt::Display for StockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pupuk" | "fertilizer" => Ok(StockKind::Fertilizer),
            "pestisida" | "pesticide" => Ok(StockKind::Pesticide),
            other => Err(format!("kind must be 'Pupuk' or 'Pestisida', got '{other}'")),
        }
    }
}

impl ToSql for StockKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for StockKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        raw.parse().map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Handling status of a problem report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlingStatus {
    Belum,
    Proses,
    Selesai,
}

impl HandlingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HandlingStatus::Belum => "Belum",
            HandlingStatus::Proses => "Proses",
            HandlingStatus::Selesai => "Selesai",
        }
    }
}

impl fmt::Display for HandlingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlingStatus {
    type Err = String;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Belum" => Ok(HandlingStatus::Belum),
            "Proses" => Ok(HandlingStatus::Proses),
            "Selesai" => Ok(HandlingStatus::Selesai),
            other => Err(format!(
                "handling status must be one of Belum, Proses, Selesai; got '{other}'"
            )),
        }
    }
}

impl ToSql for HandlingStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for HandlingStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        raw.parse().map_err(|e: String| FromSqlError::Other(e.into()))
    }
}
