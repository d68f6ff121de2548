//! Fertilization activities (`Jadwal_Pemupukan`) and the fertilizer/pesticide
//! stock tied to them (`Pupuk_Pestisida`).

use crate::core::broker::DbBroker;
use crate::core::error::SipataniError;
use crate::core::model::StockKind;
use crate::core::output::{self, OutputFormat, TableRow};
use crate::core::prompt;
use crate::core::store::Store;
use crate::core::time;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::reference;
use crate::plugins::{require_offered, require_positive};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizationRow {
    pub activity_id: i64,
    pub activity_name: String,
    pub scheduled_date: NaiveDate,
    pub dose_per_seedling: f64,
    pub plant_id: i64,
    pub plant_name: String,
    /// Kind of the first stock item, if any is linked.
    pub kind: Option<StockKind>,
}

impl TableRow for FertilizationRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID Kegiatan", "Kegiatan", "Tanggal", "Dosis/Bibit", "Tanaman", "Jenis"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.activity_id.to_string(),
            self.activity_name.clone(),
            self.scheduled_date.to_string(),
            self.dose_per_seedling.to_string(),
            format!("{} / {}", self.plant_id, self.plant_name),
            self.kind.map(|k| k.to_string()).unwrap_or_else(|| "-".to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i64,
    pub name: String,
    pub kind: StockKind,
    pub activity_id: i64,
}

impl TableRow for StockItem {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Nama Barang", "Jenis", "ID Kegiatan"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.kind.to_string(),
            self.activity_id.to_string(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct NewFertilization {
    pub plant_id: i64,
    pub kind: StockKind,
    pub activity_name: String,
    pub item_name: String,
    /// Days from creation to the scheduled application.
    pub interval_days: u32,
    pub dose_per_seedling: f64,
}

#[derive(Debug, Clone)]
pub struct NewStock {
    pub name: String,
    pub kind: StockKind,
    pub activity_id: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FertilizationField {
    #[value(alias = "1", alias = "tanggal")]
    Date,
    #[value(alias = "2", alias = "dosis")]
    Dose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FertilizationEdit {
    Date(NaiveDate),
    Dose(f64),
}

impl FertilizationEdit {
    pub fn parse(field: FertilizationField, value: &str) -> Result<Self, SipataniError> {
        let value = value.trim();
        match field {
            FertilizationField::Date => Ok(FertilizationEdit::Date(time::parse_date(value)?)),
            FertilizationField::Dose => {
                let dose = value.parse::<f64>().map_err(|_| {
                    SipataniError::ValidationError(format!("dose must be a number, got '{value}'"))
                })?;
                Ok(FertilizationEdit::Dose(require_positive(dose, "dose")?))
            }
        }
    }
}

fn require_text(value: &str, what: &str) -> Result<String, SipataniError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SipataniError::ValidationError(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub fn require_activity(conn: &Connection, id: i64) -> Result<(), SipataniError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM Jadwal_Pemupukan WHERE id_kegiatan = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    match exists {
        Some(_) => Ok(()),
        None => Err(SipataniError::NotFound(format!("fertilization activity {id}"))),
    }
}

pub fn list_fertilizations(conn: &Connection) -> Result<Vec<FertilizationRow>, SipataniError> {
    let mut stmt = conn.prepare(
        "SELECT jp.id_kegiatan, jp.nama_kegiatan, jp.tanggal_pemupukan, jp.dosis_per_bibit_tanaman,
                jp.id_tanaman, t.nama_tanaman,
                (SELECT pp.jenis FROM Pupuk_Pestisida pp
                 WHERE pp.id_kegiatan = jp.id_kegiatan
                 ORDER BY pp.id_pupukpestisida LIMIT 1)
         FROM Jadwal_Pemupukan jp
         JOIN Tanaman t ON jp.id_tanaman = t.id_tanaman
         ORDER BY jp.id_kegiatan",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(FertilizationRow {
            activity_id: row.get(0)?,
            activity_name: row.get(1)?,
            scheduled_date: row.get(2)?,
            dose_per_seedling: row.get(3)?,
            plant_id: row.get(4)?,
            plant_name: row.get(5)?,
            kind: row.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Activity ids stock items may be attached to.
pub fn list_activity_ids(conn: &Connection) -> Result<Vec<i64>, SipataniError> {
    let mut stmt = conn.prepare("SELECT id_kegiatan FROM Jadwal_Pemupukan ORDER BY id_kegiatan")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Create an activity and its first stock item together.
///
/// The activity is scheduled `interval_days` (at least 1) after `today`. Returns
/// `(activity_id, stock_id)`; either both rows exist afterwards or neither.
pub fn add_fertilization(
    conn: &mut Connection,
    new: &NewFertilization,
    today: NaiveDate,
) -> Result<(i64, i64), SipataniError> {
    let activity_name = require_text(&new.activity_name, "activity name")?;
    let item_name = require_text(&new.item_name, "item name")?;
    require_positive(new.dose_per_seedling, "dose")?;
    if new.interval_days == 0 {
        return Err(SipataniError::ValidationError(
            "interval days must be greater than 0".to_string(),
        ));
    }
    let scheduled = time::add_days(today, new.interval_days)?;

    let tx = conn.transaction()?;
    let plants = reference::list_plants(&tx)?;
    require_offered(&plants, new.plant_id, |p| p.id, "plant")?;

    tx.execute(
        "INSERT INTO Jadwal_Pemupukan (nama_kegiatan, tanggal_pemupukan, dosis_per_bibit_tanaman, id_tanaman)
         VALUES (?1, ?2, ?3, ?4)",
        params![activity_name, scheduled, new.dose_per_seedling, new.plant_id],
    )?;
    let activity_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO Pupuk_Pestisida (nama_barang, jenis, id_kegiatan) VALUES (?1, ?2, ?3)",
        params![item_name, new.kind, activity_id],
    )?;
    let stock_id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::info!(activity_id, stock_id, plant_id = new.plant_id, %scheduled, "fertilization scheduled");
    Ok((activity_id, stock_id))
}

pub fn edit_fertilization(
    conn: &Connection,
    activity_id: i64,
    edit: &FertilizationEdit,
) -> Result<(), SipataniError> {
    require_activity(conn, activity_id)?;
    match *edit {
        FertilizationEdit::Date(date) => conn.execute(
            "UPDATE Jadwal_Pemupukan SET tanggal_pemupukan = ?1 WHERE id_kegiatan = ?2",
            params![date, activity_id],
        )?,
        FertilizationEdit::Dose(dose) => conn.execute(
            "UPDATE Jadwal_Pemupukan SET dosis_per_bibit_tanaman = ?1 WHERE id_kegiatan = ?2",
            params![require_positive(dose, "dose")?, activity_id],
        )?,
    };
    tracing::info!(activity_id, ?edit, "fertilization updated");
    Ok(())
}

/// Delete an activity and its stock rows. Returns how many stock rows went with it.
pub fn delete_fertilization(conn: &mut Connection, activity_id: i64) -> Result<usize, SipataniError> {
    let tx = conn.transaction()?;
    require_activity(&tx, activity_id)?;
    let stock_rows = tx.execute(
        "DELETE FROM Pupuk_Pestisida WHERE id_kegiatan = ?1",
        params![activity_id],
    )?;
    tx.execute(
        "DELETE FROM Jadwal_Pemupukan WHERE id_kegiatan = ?1",
        params![activity_id],
    )?;
    tx.commit()?;
    tracing::info!(activity_id, stock_rows, "fertilization deleted");
    Ok(stock_rows)
}

pub fn list_stock(conn: &Connection) -> Result<Vec<StockItem>, SipataniError> {
    let mut stmt = conn.prepare(
        "SELECT id_pupukpestisida, nama_barang, jenis, id_kegiatan
         FROM Pupuk_Pestisida ORDER BY id_pupukpestisida",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StockItem {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            activity_id: row.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Add a stock item. The activity id must be one of [`list_activity_ids`].
pub fn add_stock(conn: &Connection, new: &NewStock) -> Result<i64, SipataniError> {
    let name = require_text(&new.name, "item name")?;
    let offered = list_activity_ids(conn)?;
    require_offered(&offered, new.activity_id, |id| *id, "activity")?;

    conn.execute(
        "INSERT INTO Pupuk_Pestisida (nama_barang, jenis, id_kegiatan) VALUES (?1, ?2, ?3)",
        params![name, new.kind, new.activity_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(stock_id = id, activity_id = new.activity_id, "stock item added");
    Ok(id)
}

pub fn require_stock(conn: &Connection, id: i64) -> Result<(), SipataniError> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM Pupuk_Pestisida WHERE id_pupukpestisida = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    exists
        .map(|_| ())
        .ok_or_else(|| SipataniError::NotFound(format!("stock item {id}")))
}

pub fn delete_stock(conn: &Connection, id: i64) -> Result<(), SipataniError> {
    let removed = conn.execute(
        "DELETE FROM Pupuk_Pestisida WHERE id_pupukpestisida = ?1",
        params![id],
    )?;
    if removed == 0 {
        return Err(SipataniError::NotFound(format!("stock item {id}")));
    }
    tracing::info!(stock_id = id, "stock item deleted");
    Ok(())
}

// ===== CLI =====

fn parse_kind(input: &str) -> Result<StockKind, String> {
    input.parse()
}

#[derive(Parser, Debug)]
#[clap(name = "fertilization", about = "Manage fertilization activities.")]
pub struct FertilizationCli {
    #[clap(subcommand)]
    pub command: FertilizationCommand,
}

#[derive(Subcommand, Debug)]
pub enum FertilizationCommand {
    /// List activities with their plant and stock kind.
    List,
    /// Schedule an activity and record its first stock item.
    Add {
        #[clap(long)]
        plant: i64,
        /// Pupuk (fertilizer) or Pestisida (pesticide).
        #[clap(long, value_parser = parse_kind)]
        kind: StockKind,
        /// Activity name.
        #[clap(long)]
        activity: String,
        /// Stock item name.
        #[clap(long)]
        item: String,
        /// Days from today to the application date (at least 1).
        #[clap(long)]
        interval_days: u32,
        /// Dose per seedling.
        #[clap(long)]
        dose: f64,
    },
    /// Change the date or dose of an activity.
    Edit {
        #[clap(long)]
        id: i64,
        #[clap(long, value_enum)]
        field: FertilizationField,
        #[clap(long)]
        value: String,
    },
    /// Delete an activity and its stock items.
    Delete {
        #[clap(long)]
        id: i64,
        /// Skip the confirmation prompt.
        #[clap(long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "stock", about = "Manage fertilizer and pesticide stock.")]
pub struct StockCli {
    #[clap(subcommand)]
    pub command: StockCommand,
}

#[derive(Subcommand, Debug)]
pub enum StockCommand {
    List,
    /// Add a stock item to an existing activity.
    Add {
        #[clap(long)]
        name: String,
        #[clap(long, value_parser = parse_kind)]
        kind: StockKind,
        /// Activity id, one of `fertilization list`.
        #[clap(long)]
        activity: i64,
    },
    Delete {
        #[clap(long)]
        id: i64,
        #[clap(long)]
        yes: bool,
    },
}

fn print_done(format: OutputFormat, cmd: &str, message: &str, status: ItemStatus, extra: serde_json::Value) {
    match format {
        OutputFormat::Json => println!("{}", time::command_envelope(cmd, "ok", extra)),
        OutputFormat::Text => tui::print_status_line(message, status),
    }
}

pub fn run_fertilization_cli(
    store: &Store,
    cli: FertilizationCli,
    format: OutputFormat,
) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        FertilizationCommand::List => {
            let rows = broker.read(list_fertilizations)?;
            output::print_rows("JADWAL PEMUPUKAN", &rows, format, "No fertilization activities found.")?;
        }
        FertilizationCommand::Add {
            plant,
            kind,
            activity,
            item,
            interval_days,
            dose,
        } => {
            let new = NewFertilization {
                plant_id: plant,
                kind,
                activity_name: activity,
                item_name: item,
                interval_days,
                dose_per_seedling: dose,
            };
            let (activity_id, stock_id) = broker.with_conn("fertilization.add", |conn| {
                add_fertilization(conn, &new, time::today())
            })?;
            print_done(
                format,
                "fertilization.add",
                &format!("Activity {activity_id} scheduled with stock item {stock_id}"),
                ItemStatus::Created,
                serde_json::json!({ "activity_id": activity_id, "stock_id": stock_id }),
            );
        }
        FertilizationCommand::Edit { id, field, value } => {
            let edit = FertilizationEdit::parse(field, &value)?;
            broker.with_conn("fertilization.edit", |conn| edit_fertilization(conn, id, &edit))?;
            print_done(
                format,
                "fertilization.edit",
                &format!("Activity {id} updated"),
                ItemStatus::Updated,
                serde_json::json!({ "id": id }),
            );
        }
        FertilizationCommand::Delete { id, yes } => {
            broker.read(|conn| require_activity(conn, id))?;
            if !prompt::confirm(&format!("Delete fertilization activity {id} and its stock?"), yes)? {
                output::print_cancelled(format, "fertilization.delete", id);
                return Ok(());
            }
            let stock_rows = broker.with_conn("fertilization.delete", |conn| delete_fertilization(conn, id))?;
            print_done(
                format,
                "fertilization.delete",
                &format!("Activity {id} deleted ({stock_rows} stock item(s) removed)"),
                ItemStatus::Deleted,
                serde_json::json!({ "id": id, "stock_rows": stock_rows }),
            );
        }
    }
    Ok(())
}

pub fn run_stock_cli(store: &Store, cli: StockCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        StockCommand::List => {
            let rows = broker.read(list_stock)?;
            output::print_rows("STOK PUPUK & PESTISIDA", &rows, format, "No stock items found.")?;
        }
        StockCommand::Add { name, kind, activity } => {
            let new = NewStock {
                name,
                kind,
                activity_id: activity,
            };
            let id = broker.with_conn("stock.add", |conn| add_stock(conn, &new))?;
            print_done(
                format,
                "stock.add",
                &format!("Stock item {id} added"),
                ItemStatus::Created,
                serde_json::json!({ "id": id }),
            );
        }
        StockCommand::Delete { id, yes } => {
            broker.read(|conn| require_stock(conn, id))?;
            if !prompt::confirm(&format!("Delete stock item {id}?"), yes)? {
                output::print_cancelled(format, "stock.delete", id);
                return Ok(());
            }
            broker.with_conn("stock.delete", |conn| delete_stock(conn, id))?;
            print_done(
                format,
                "stock.delete",
                &format!("Stock item {id} deleted"),
                ItemStatus::Deleted,
                serde_json::json!({ "id": id }),
            );
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "fertilization",
        "version": "0.1.0",
        "description": "Fertilization activities and fertilizer/pesticide stock",
        "commands": [
            { "name": "fertilization list" },
            { "name": "fertilization add", "parameters": ["plant", "kind", "activity", "item", "interval-days", "dose"] },
            { "name": "fertilization edit", "parameters": ["id", "field", "value"] },
            { "name": "fertilization delete", "parameters": ["id", "yes"] },
            { "name": "stock list" },
            { "name": "stock add", "parameters": ["name", "kind", "activity"] },
            { "name": "stock delete", "parameters": ["id", "yes"] }
        ],
        "storage": ["Jadwal_Pemupukan", "Pupuk_Pestisida"]
    })
}
