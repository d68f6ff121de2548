//! Problem reports (`laporan_masalah`) raised against planting schedules.

use crate::core::broker::DbBroker;
use crate::core::error::SipataniError;
use crate::core::model::HandlingStatus;
use crate::core::output::{self, OutputFormat, TableRow, compact_line};
use crate::core::prompt;
use crate::core::store::Store;
use crate::core::time;
use crate::core::tui::{self, ItemStatus};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemReport {
    pub id: i64,
    pub schedule_id: i64,
    pub reported_on: NaiveDate,
    pub kind: String,
    pub description: String,
    pub status: HandlingStatus,
    pub solution: Option<String>,
}

impl TableRow for ProblemReport {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "ID Jadwal", "Tanggal", "Jenis", "Deskripsi", "Status", "Solusi"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.schedule_id.to_string(),
            self.reported_on.to_string(),
            self.kind.clone(),
            compact_line(&self.description, 48),
            self.status.to_string(),
            self.solution
                .as_deref()
                .map(|s| compact_line(s, 48))
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

/// Everything an operator supplies for a report, used by both add and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportInput {
    pub schedule_id: i64,
    pub reported_on: NaiveDate,
    pub kind: String,
    pub description: String,
    pub status: HandlingStatus,
    pub solution: Option<String>,
}

impl ReportInput {
    fn validated(&self) -> Result<(String, String, Option<String>), SipataniError> {
        let kind = self.kind.trim();
        if kind.is_empty() {
            return Err(SipataniError::ValidationError("problem kind must not be empty".to_string()));
        }
        if kind.chars().count() > 50 {
            return Err(SipataniError::ValidationError(
                "problem kind must be at most 50 characters".to_string(),
            ));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(SipataniError::ValidationError(
                "problem description must not be empty".to_string(),
            ));
        }
        let solution = self
            .solution
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok((kind.to_string(), description.to_string(), solution))
    }
}

fn require_schedule(conn: &Connection, schedule_id: i64) -> Result<(), SipataniError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM Jadwal_Tanam WHERE id_jadwal_tanam = ?1",
            params![schedule_id],
            |row| row.get(0),
        )
        .optional()?;
    exists
        .map(|_| ())
        .ok_or_else(|| SipataniError::NotFound(format!("schedule {schedule_id}")))
}

fn not_found(id: i64) -> SipataniError {
    SipataniError::NotFound(format!("problem report {id}"))
}

pub fn add_report(conn: &Connection, input: &ReportInput) -> Result<i64, SipataniError> {
    let (kind, description, solution) = input.validated()?;
    require_schedule(conn, input.schedule_id)?;
    conn.execute(
        "INSERT INTO laporan_masalah
            (id_jadwal_tanam, tanggal_masalah, jenis, deskripsi, status_penanganan, solusi)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.schedule_id,
            input.reported_on,
            kind,
            description,
            input.status,
            solution
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(report_id = id, schedule_id = input.schedule_id, "problem report added");
    Ok(id)
}

/// All reports, latest `tanggal_masalah` first, ties broken by descending id.
pub fn list_reports(conn: &Connection) -> Result<Vec<ProblemReport>, SipataniError> {
    let mut stmt = conn.prepare(
        "SELECT id, id_jadwal_tanam, tanggal_masalah, jenis, deskripsi, status_penanganan, solusi
         FROM laporan_masalah ORDER BY tanggal_masalah DESC, id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ProblemReport {
            id: row.get(0)?,
            schedule_id: row.get(1)?,
            reported_on: row.get(2)?,
            kind: row.get(3)?,
            description: row.get(4)?,
            status: row.get(5)?,
            solution: row.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_report(conn: &Connection, id: i64) -> Result<Option<ProblemReport>, SipataniError> {
    let report = conn
        .query_row(
            "SELECT id, id_jadwal_tanam, tanggal_masalah, jenis, deskripsi, status_penanganan, solusi
             FROM laporan_masalah WHERE id = ?1",
            params![id],
            |row| {
                Ok(ProblemReport {
                    id: row.get(0)?,
                    schedule_id: row.get(1)?,
                    reported_on: row.get(2)?,
                    kind: row.get(3)?,
                    description: row.get(4)?,
                    status: row.get(5)?,
                    solution: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(report)
}

/// Replace every editable column of a report.
pub fn edit_report(conn: &Connection, id: i64, input: &ReportInput) -> Result<(), SipataniError> {
    let (kind, description, solution) = input.validated()?;
    require_schedule(conn, input.schedule_id)?;
    let changed = conn.execute(
        "UPDATE laporan_masalah
         SET id_jadwal_tanam = ?1, tanggal_masalah = ?2, jenis = ?3, deskripsi = ?4,
             status_penanganan = ?5, solusi = ?6
         WHERE id = ?7",
        params![
            input.schedule_id,
            input.reported_on,
            kind,
            description,
            input.status,
            solution,
            id
        ],
    )?;
    if changed == 0 {
        return Err(not_found(id));
    }
    tracing::info!(report_id = id, "problem report edited");
    Ok(())
}

/// Set the handling status and solution. A `None` solution clears it.
pub fn update_status_solution(
    conn: &Connection,
    id: i64,
    status: HandlingStatus,
    solution: Option<&str>,
) -> Result<(), SipataniError> {
    let solution = solution.map(str::trim).filter(|s| !s.is_empty());
    let changed = conn.execute(
        "UPDATE laporan_masalah SET status_penanganan = ?1, solusi = ?2 WHERE id = ?3",
        params![status, solution, id],
    )?;
    if changed == 0 {
        return Err(not_found(id));
    }
    tracing::info!(report_id = id, %status, "problem report status updated");
    Ok(())
}

pub fn delete_report(conn: &Connection, id: i64) -> Result<(), SipataniError> {
    let removed = conn.execute("DELETE FROM laporan_masalah WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(not_found(id));
    }
    tracing::info!(report_id = id, "problem report deleted");
    Ok(())
}

// ===== CLI =====

fn parse_status(input: &str) -> Result<HandlingStatus, String> {
    input.parse()
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[clap(long)]
    pub schedule: i64,
    /// Date the problem was found, YYYY-MM-DD.
    #[clap(long, value_parser = time::parse_date_arg)]
    pub date: NaiveDate,
    /// Problem kind (hama, penyakit, cuaca, ...).
    #[clap(long)]
    pub kind: String,
    #[clap(long)]
    pub description: String,
    /// Belum, Proses or Selesai.
    #[clap(long, value_parser = parse_status)]
    pub status: HandlingStatus,
    #[clap(long)]
    pub solution: Option<String>,
}

impl From<ReportArgs> for ReportInput {
    fn from(args: ReportArgs) -> Self {
        ReportInput {
            schedule_id: args.schedule,
            reported_on: args.date,
            kind: args.kind,
            description: args.description,
            status: args.status,
            solution: args.solution,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "report", about = "Track problems found on planting schedules.")]
pub struct ReportCli {
    #[clap(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// List reports by report date, newest first (not by id).
    ///
    /// Reports filed for the same date are shown highest id first.
    List,
    /// File a new report against a schedule.
    Add(ReportArgs),
    /// Rewrite all fields of a report.
    Edit {
        #[clap(long)]
        id: i64,
        #[clap(flatten)]
        fields: ReportArgs,
    },
    /// Update handling status and solution.
    Status {
        #[clap(long)]
        id: i64,
        #[clap(long, value_parser = parse_status)]
        status: HandlingStatus,
        #[clap(long)]
        solution: Option<String>,
    },
    Delete {
        #[clap(long)]
        id: i64,
        #[clap(long)]
        yes: bool,
    },
}

fn print_done(format: OutputFormat, cmd: &str, message: &str, status: ItemStatus, id: i64) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            time::command_envelope(cmd, "ok", serde_json::json!({ "id": id }))
        ),
        OutputFormat::Text => tui::print_status_line(message, status),
    }
}

pub fn run_report_cli(store: &Store, cli: ReportCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        ReportCommand::List => {
            let rows = broker.read(list_reports)?;
            output::print_rows("LAPORAN MASALAH", &rows, format, "No problem reports found.")?;
        }
        ReportCommand::Add(args) => {
            let input = ReportInput::from(args);
            let id = broker.with_conn("report.add", |conn| add_report(conn, &input))?;
            print_done(format, "report.add", &format!("Report {id} filed"), ItemStatus::Created, id);
        }
        ReportCommand::Edit { id, fields } => {
            let input = ReportInput::from(fields);
            broker.with_conn("report.edit", |conn| edit_report(conn, id, &input))?;
            print_done(format, "report.edit", &format!("Report {id} updated"), ItemStatus::Updated, id);
        }
        ReportCommand::Status { id, status, solution } => {
            broker.with_conn("report.status", |conn| {
                update_status_solution(conn, id, status, solution.as_deref())
            })?;
            print_done(
                format,
                "report.status",
                &format!("Report {id} is now {status}"),
                ItemStatus::Updated,
                id,
            );
        }
        ReportCommand::Delete { id, yes } => {
            if broker.read(|conn| get_report(conn, id))?.is_none() {
                return Err(not_found(id));
            }
            if !prompt::confirm(&format!("Delete problem report {id}?"), yes)? {
                output::print_cancelled(format, "report.delete", id);
                return Ok(());
            }
            broker.with_conn("report.delete", |conn| delete_report(conn, id))?;
            print_done(format, "report.delete", &format!("Report {id} deleted"), ItemStatus::Deleted, id);
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "report",
        "version": "0.1.0",
        "description": "Problem reports with handling status",
        "commands": [
            { "name": "list" },
            { "name": "add", "parameters": ["schedule", "date", "kind", "description", "status", "solution"] },
            { "name": "edit", "parameters": ["id", "schedule", "date", "kind", "description", "status", "solution"] },
            { "name": "status", "parameters": ["id", "status", "solution"] },
            { "name": "delete", "parameters": ["id", "yes"] }
        ],
        "storage": ["laporan_masalah"],
        "handling_status": ["Belum", "Proses", "Selesai"]
    })
}
