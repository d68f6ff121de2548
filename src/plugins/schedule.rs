//! Planting schedules (`Jadwal_Tanam`).
//!
//! A schedule ties a land plot and a plant species to a planting date and a
//! status. Deleting a schedule is the one operation with real rules: its
//! harvests, problem reports and crop issues are counted first, a second
//! confirmation is required when any exist, and everything is removed in a
//! single transaction.

use crate::core::broker::DbBroker;
use crate::core::error::SipataniError;
use crate::core::ids::{self, Sequence};
use crate::core::model::ScheduleStatus;
use crate::core::output::{self, OutputFormat, TableRow};
use crate::core::prompt;
use crate::core::store::Store;
use crate::core::time;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::reference;
use crate::plugins::require_offered;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub id: i64,
    pub land_id: i64,
    pub farmer_id: i64,
    pub plant_id: i64,
    pub plant_name: String,
    pub spacing_cm: f64,
    pub employees: i64,
    pub planting_date: NaiveDate,
    pub duration_days: i64,
    pub status: ScheduleStatus,
}

impl TableRow for ScheduleRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "ID Jadwal",
            "ID Lahan",
            "ID Petani",
            "ID Tanaman",
            "Nama Tanaman",
            "Jarak Tanaman (cm)",
            "Jumlah Pegawai",
            "Tanggal Tanam",
            "Durasi (hari)",
            "Status Jadwal",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.land_id.to_string(),
            self.farmer_id.to_string(),
            self.plant_id.to_string(),
            self.plant_name.clone(),
            self.spacing_cm.to_string(),
            self.employees.to_string(),
            self.planting_date.to_string(),
            self.duration_days.to_string(),
            self.status.label().to_string(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub plant_id: i64,
    pub land_id: i64,
    pub planting_date: NaiveDate,
}

/// Which column an edit touches. Aliases match the numbered edit menu.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ScheduleField {
    #[value(alias = "1", alias = "tanggal")]
    Date,
    #[value(alias = "2", alias = "lahan")]
    Land,
    #[value(alias = "3", alias = "tanaman")]
    Plant,
    #[value(alias = "4")]
    Status,
}

/// A validated single-column change to a schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleEdit {
    Date(NaiveDate),
    Land(i64),
    Plant(i64),
    Status(ScheduleStatus),
}

impl ScheduleEdit {
    /// Validate `value` for `field`. Nothing is written on failure.
    pub fn parse(field: ScheduleField, value: &str) -> Result<Self, SipataniError> {
        let value = value.trim();
        let parse_id = |what: &str| {
            value.parse::<i64>().map_err(|_| {
                SipataniError::ValidationError(format!("{what} id must be a number, got '{value}'"))
            })
        };
        match field {
            ScheduleField::Date => Ok(ScheduleEdit::Date(time::parse_date(value)?)),
            ScheduleField::Land => Ok(ScheduleEdit::Land(parse_id("land")?)),
            ScheduleField::Plant => Ok(ScheduleEdit::Plant(parse_id("plant")?)),
            ScheduleField::Status => value
                .parse::<ScheduleStatus>()
                .map(ScheduleEdit::Status)
                .map_err(SipataniError::ValidationError),
        }
    }
}

/// Rows in other tables that point at a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Dependents {
    pub harvests: i64,
    pub reports: i64,
    pub crop_issues: i64,
}

impl Dependents {
    pub fn total(&self) -> i64 {
        self.harvests + self.reports + self.crop_issues
    }
}

const SCHEDULE_SELECT: &str = "
    SELECT
        jt.id_jadwal_tanam,
        jt.id_lahan,
        l.id_petani,
        jt.id_tanaman,
        t.nama_tanaman,
        t.jarak_antar_tanaman,
        l.jumlah_pegawai,
        jt.tanggal,
        t.durasi_tanam,
        jt.status_jadwal_id
    FROM Jadwal_Tanam jt
    JOIN Lahan l ON jt.id_lahan = l.id_lahan
    JOIN Tanaman t ON jt.id_tanaman = t.id_tanaman
";

fn map_schedule_row(row: &Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        land_id: row.get(1)?,
        farmer_id: row.get(2)?,
        plant_id: row.get(3)?,
        plant_name: row.get(4)?,
        spacing_cm: row.get(5)?,
        employees: row.get(6)?,
        planting_date: row.get(7)?,
        duration_days: row.get(8)?,
        status: row.get(9)?,
    })
}

fn query_schedules(
    conn: &Connection,
    filter: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<ScheduleRow>, SipataniError> {
    let sql = format!("{SCHEDULE_SELECT} {filter} ORDER BY jt.id_jadwal_tanam");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(args, map_schedule_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn list_schedules(conn: &Connection) -> Result<Vec<ScheduleRow>, SipataniError> {
    query_schedules(conn, "", &[])
}

/// Schedules a harvest may be recorded against.
pub fn list_ready_schedules(conn: &Connection) -> Result<Vec<ScheduleRow>, SipataniError> {
    query_schedules(
        conn,
        "WHERE jt.status_jadwal_id = ?1",
        &[&ScheduleStatus::ReadyToHarvest as &dyn rusqlite::ToSql],
    )
}

pub fn get_schedule(conn: &Connection, id: i64) -> Result<Option<ScheduleRow>, SipataniError> {
    let sql = format!("{SCHEDULE_SELECT} WHERE jt.id_jadwal_tanam = ?1");
    let row = conn
        .query_row(&sql, params![id], map_schedule_row)
        .optional()?;
    Ok(row)
}

fn require_schedule(conn: &Connection, id: i64) -> Result<(), SipataniError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM Jadwal_Tanam WHERE id_jadwal_tanam = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    match exists {
        Some(_) => Ok(()),
        None => Err(SipataniError::NotFound(format!("schedule {id}"))),
    }
}

/// Create a schedule in the default `Scheduled` status and return its id.
pub fn add_schedule(conn: &Connection, new: &NewSchedule) -> Result<i64, SipataniError> {
    let plants = reference::list_plants(conn)?;
    require_offered(&plants, new.plant_id, |p| p.id, "plant")?;
    let lands = reference::list_land(conn)?;
    require_offered(&lands, new.land_id, |l| l.id, "land")?;

    conn.execute(
        "INSERT INTO Jadwal_Tanam (tanggal, id_lahan, id_tanaman, status_jadwal_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            new.planting_date,
            new.land_id,
            new.plant_id,
            ScheduleStatus::default()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(
        schedule_id = id,
        plant_id = new.plant_id,
        land_id = new.land_id,
        "schedule created"
    );
    Ok(id)
}

/// Apply one validated field change. Land and plant ids must be registered.
pub fn edit_schedule(conn: &Connection, id: i64, edit: &ScheduleEdit) -> Result<(), SipataniError> {
    require_schedule(conn, id)?;

    let changed = match *edit {
        ScheduleEdit::Date(date) => conn.execute(
            "UPDATE Jadwal_Tanam SET tanggal = ?1 WHERE id_jadwal_tanam = ?2",
            params![date, id],
        )?,
        ScheduleEdit::Land(land_id) => {
            let lands = reference::list_land(conn)?;
            require_offered(&lands, land_id, |l| l.id, "land")?;
            conn.execute(
                "UPDATE Jadwal_Tanam SET id_lahan = ?1 WHERE id_jadwal_tanam = ?2",
                params![land_id, id],
            )?
        }
        ScheduleEdit::Plant(plant_id) => {
            let plants = reference::list_plants(conn)?;
            require_offered(&plants, plant_id, |p| p.id, "plant")?;
            conn.execute(
                "UPDATE Jadwal_Tanam SET id_tanaman = ?1 WHERE id_jadwal_tanam = ?2",
                params![plant_id, id],
            )?
        }
        ScheduleEdit::Status(status) => conn.execute(
            "UPDATE Jadwal_Tanam SET status_jadwal_id = ?1 WHERE id_jadwal_tanam = ?2",
            params![status, id],
        )?,
    };
    tracing::info!(schedule_id = id, ?edit, rows = changed, "schedule updated");
    Ok(())
}

pub fn count_dependents(conn: &Connection, id: i64) -> Result<Dependents, SipataniError> {
    let count = |sql: &str| -> Result<i64, SipataniError> {
        Ok(conn.query_row(sql, params![id], |row| row.get(0))?)
    };
    Ok(Dependents {
        harvests: count("SELECT COUNT(*) FROM Hasil_Panen WHERE id_jadwal_tanam = ?1")?,
        reports: count("SELECT COUNT(*) FROM laporan_masalah WHERE id_jadwal_tanam = ?1")?,
        crop_issues: count("SELECT COUNT(*) FROM Masalah_Tanam WHERE id_jadwal_tanam = ?1")?,
    })
}

/// Delete a schedule together with everything that references it.
///
/// When dependents exist, `confirm_dependents` is asked before anything is
/// removed. A refusal is a [`SipataniError::RuleViolation`], and an error from
/// the callback is returned as is; either way the database is untouched. Dependents go first, then the schedule, all inside one
/// transaction. Returns what was removed besides the schedule itself.
pub fn delete_schedule<F>(
    conn: &mut Connection,
    id: i64,
    confirm_dependents: F,
) -> Result<Dependents, SipataniError>
where
    F: FnOnce(&Dependents) -> Result<bool, SipataniError>,
{
    let tx = conn.transaction()?;
    require_schedule(&tx, id)?;

    let deps = count_dependents(&tx, id)?;
    if deps.total() > 0 {
        tracing::debug!(schedule_id = id, dependents = deps.total(), "schedule has dependents");
        if !confirm_dependents(&deps)? {
            tracing::warn!(schedule_id = id, "dependent deletion not confirmed");
            return Err(SipataniError::RuleViolation(format!(
                "schedule {id} has {} related rows; deletion was not confirmed",
                deps.total()
            )));
        }
    }

    tx.execute("DELETE FROM Hasil_Panen WHERE id_jadwal_tanam = ?1", params![id])?;
    tx.execute("DELETE FROM laporan_masalah WHERE id_jadwal_tanam = ?1", params![id])?;
    tx.execute("DELETE FROM Masalah_Tanam WHERE id_jadwal_tanam = ?1", params![id])?;
    tx.execute("DELETE FROM Jadwal_Tanam WHERE id_jadwal_tanam = ?1", params![id])?;
    tx.commit()?;

    tracing::info!(schedule_id = id, dependents = deps.total(), "schedule deleted");
    Ok(deps)
}

// ===== CLI =====

#[derive(Parser, Debug)]
#[clap(name = "schedule", about = "Manage planting schedules.")]
pub struct ScheduleCli {
    #[clap(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// List all schedules with land, plant and status details.
    List,
    /// List schedules that are ready to harvest.
    Ready,
    /// Show the id the next new schedule will receive.
    NextId,
    /// Add a schedule (status starts as Scheduled/993).
    Add {
        #[clap(long)]
        plant: i64,
        #[clap(long)]
        land: i64,
        /// Planting date, YYYY-MM-DD.
        #[clap(long, value_parser = time::parse_date_arg)]
        date: NaiveDate,
    },
    /// Change one field of a schedule.
    Edit {
        #[clap(long)]
        id: i64,
        /// date | land | plant | status (or 1-4)
        #[clap(long, value_enum)]
        field: ScheduleField,
        /// New value: YYYY-MM-DD, an id, or a status (993/994/995).
        #[clap(long)]
        value: String,
    },
    /// Delete a schedule and, after confirmation, its related rows.
    Delete {
        #[clap(long)]
        id: i64,
        /// Answer yes to every confirmation.
        #[clap(long)]
        yes: bool,
    },
}

pub fn run_schedule_cli(store: &Store, cli: ScheduleCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        ScheduleCommand::List => {
            let rows = broker.read(list_schedules)?;
            output::print_rows("SEMUA JADWAL TANAM", &rows, format, "No planting schedules found.")?;
        }
        ScheduleCommand::Ready => {
            let rows = broker.read(list_ready_schedules)?;
            output::print_rows("JADWAL SIAP PANEN", &rows, format, "No schedules are ready to harvest.")?;
        }
        ScheduleCommand::NextId => {
            let next = broker.read(|conn| ids::peek_next_id(conn, Sequence::Schedule))?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    time::command_envelope("schedule.next-id", "ok", serde_json::json!({ "next_id": next }))
                ),
                OutputFormat::Text => println!("{}", next),
            }
        }
        ScheduleCommand::Add { plant, land, date } => {
            let new = NewSchedule {
                plant_id: plant,
                land_id: land,
                planting_date: date,
            };
            let (id, row) = broker.with_conn("schedule.add", |conn| {
                let id = add_schedule(conn, &new)?;
                Ok((id, get_schedule(conn, id)?))
            })?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    time::command_envelope("schedule.add", "ok", serde_json::json!({ "id": id, "schedule": row }))
                ),
                OutputFormat::Text => {
                    tui::print_status_line("Planting schedule added", ItemStatus::Created);
                    if let Some(row) = row {
                        tui::print_fields(&[
                            ("ID Jadwal", row.id.to_string()),
                            ("Tanaman", row.plant_name),
                            ("Lahan", row.land_id.to_string()),
                            ("Tanggal Tanam", row.planting_date.to_string()),
                            ("Durasi", format!("{} hari", row.duration_days)),
                            ("Jarak Antar Tanaman", format!("{} cm", row.spacing_cm)),
                        ]);
                    }
                }
            }
        }
        ScheduleCommand::Edit { id, field, value } => {
            let edit = ScheduleEdit::parse(field, &value)?;
            broker.with_conn("schedule.edit", |conn| edit_schedule(conn, id, &edit))?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    time::command_envelope("schedule.edit", "ok", serde_json::json!({ "id": id }))
                ),
                OutputFormat::Text => {
                    tui::print_status_line(&format!("Schedule {id} updated"), ItemStatus::Updated)
                }
            }
        }
        ScheduleCommand::Delete { id, yes } => {
            let found = broker.read(|conn| get_schedule(conn, id))?;
            if found.is_none() {
                return Err(SipataniError::NotFound(format!("schedule {id}")));
            }
            if !prompt::confirm(&format!("Delete planting schedule {id}?"), yes)? {
                output::print_cancelled(format, "schedule.delete", id);
                return Ok(());
            }
            let removed = broker.with_conn("schedule.delete", |conn| {
                delete_schedule(conn, id, |deps| {
                    let summary = format!(
                        "{} harvest(s), {} report(s), {} crop issue(s)",
                        deps.harvests, deps.reports, deps.crop_issues
                    );
                    if format == OutputFormat::Text {
                        tui::render_box("RELATED DATA FOUND", &summary, tui::BoxStyle::Warning);
                    }
                    prompt::confirm(&format!("Also delete {summary} linked to schedule {id}?"), yes)
                })
            })?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    time::command_envelope(
                        "schedule.delete",
                        "ok",
                        serde_json::json!({ "id": id, "removed_dependents": removed })
                    )
                ),
                OutputFormat::Text => tui::print_status_line(
                    &format!("Schedule {id} deleted ({} related rows removed)", removed.total()),
                    ItemStatus::Deleted,
                ),
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "schedule",
        "version": "0.1.0",
        "description": "Planting schedules with cascade-checked deletion",
        "commands": [
            { "name": "list" },
            { "name": "ready" },
            { "name": "next-id" },
            { "name": "add", "parameters": ["plant", "land", "date"] },
            { "name": "edit", "parameters": ["id", "field", "value"] },
            { "name": "delete", "parameters": ["id", "yes"] }
        ],
        "storage": ["Jadwal_Tanam"]
    })
}
