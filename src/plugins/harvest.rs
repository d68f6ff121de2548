use crate::core::broker::DbBroker;
use crate::core::error::SipataniError;
use crate::core::model::ScheduleStatus;
use crate::core::output::{self, OutputFormat, TableRow, format_rupiah};
use crate::core::store::Store;
use crate::core::time;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::require_positive;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

/// Activity id recorded when the plant has no fertilization activity.
pub const DEFAULT_ACTIVITY_ID: i64 = 301;

#[derive(Debug, Clone)]
pub struct NewHarvest {
    pub schedule_id: i64,
    pub harvest_date: NaiveDate,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestReceipt {
    pub id: i64,
    pub schedule_id: i64,
    pub plant_id: i64,
    pub activity_id: i64,
    pub harvest_date: NaiveDate,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestRow {
    pub id: i64,
    pub harvest_date: NaiveDate,
    pub schedule_id: i64,
    pub plant_id: i64,
    pub plant_name: String,
    pub activity_id: i64,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
    pub total_value: f64,
}

impl TableRow for HarvestRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "ID Panen",
            "Tanggal",
            "ID Jadwal",
            "Tanaman",
            "ID Kegiatan",
            "Jumlah (kg)",
            "Harga/kg",
            "Total Nilai",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.harvest_date.to_string(),
            self.schedule_id.to_string(),
            format!("{} / {}", self.plant_id, self.plant_name),
            self.activity_id.to_string(),
            self.quantity_kg.to_string(),
            format_rupiah(self.price_per_kg),
            format_rupiah(self.total_value),
        ]
    }
}

pub fn total_value(quantity_kg: f64, price_per_kg: f64) -> f64 {
    quantity_kg * price_per_kg
}

/// Most recent fertilization activity for the plant, or [`DEFAULT_ACTIVITY_ID`].
pub fn resolve_activity_id(conn: &Connection, plant_id: i64) -> Result<i64, SipataniError> {
    let latest: Option<i64> = conn
        .query_row(
            "SELECT id_kegiatan FROM Jadwal_Pemupukan
             WHERE id_tanaman = ?1
             ORDER BY id_kegiatan DESC LIMIT 1",
            params![plant_id],
            |row| row.get(0),
        )
        .optional()?;
    let id = latest.unwrap_or(DEFAULT_ACTIVITY_ID);
    tracing::debug!(plant_id, activity_id = id, defaulted = latest.is_none(), "resolved activity");
    Ok(id)
}

/// Record a harvest against a schedule that is ready to harvest.
pub fn record_harvest(conn: &mut Connection, new: &NewHarvest) -> Result<HarvestReceipt, SipataniError> {
    require_positive(new.quantity_kg, "harvest quantity")?;
    require_positive(new.price_per_kg, "price per kg")?;

    let tx = conn.transaction()?;
    let schedule: Option<(i64, ScheduleStatus)> = tx
        .query_row(
            "SELECT id_tanaman, status_jadwal_id FROM Jadwal_Tanam WHERE id_jadwal_tanam = ?1",
            params![new.schedule_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((plant_id, status)) = schedule else {
        return Err(SipataniError::NotFound(format!("schedule {}", new.schedule_id)));
    };
    if status != ScheduleStatus::ReadyToHarvest {
        tracing::warn!(schedule_id = new.schedule_id, %status, "harvest rejected");
        return Err(SipataniError::RuleViolation(format!(
            "schedule {} is {}, not ready to harvest",
            new.schedule_id, status
        )));
    }

    let activity_id = resolve_activity_id(&tx, plant_id)?;
    tx.execute(
        "INSERT INTO Hasil_Panen (tanggal, jumlah_panen_kg, harga_per_kg, id_tanaman, id_jadwal_tanam, id_kegiatan)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.harvest_date,
            new.quantity_kg,
            new.price_per_kg,
            plant_id,
            new.schedule_id,
            activity_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::info!(harvest_id = id, schedule_id = new.schedule_id, "harvest recorded");
    Ok(HarvestReceipt {
        id,
        schedule_id: new.schedule_id,
        plant_id,
        activity_id,
        harvest_date: new.harvest_date,
        quantity_kg: new.quantity_kg,
        price_per_kg: new.price_per_kg,
        total_value: total_value(new.quantity_kg, new.price_per_kg),
    })
}

pub fn list_harvests(conn: &Connection) -> Result<Vec<HarvestRow>, SipataniError> {
    let mut stmt = conn.prepare(
        "SELECT hp.id_panen, hp.tanggal, hp.id_jadwal_tanam, hp.id_tanaman, t.nama_tanaman,
                hp.id_kegiatan, hp.jumlah_panen_kg, hp.harga_per_kg
         FROM Hasil_Panen hp
         JOIN Tanaman t ON hp.id_tanaman = t.id_tanaman
         ORDER BY hp.id_panen",
    )?;
    let rows = stmt.query_map([], |row| {
        let quantity_kg: f64 = row.get(6)?;
        let price_per_kg: f64 = row.get(7)?;
        Ok(HarvestRow {
            id: row.get(0)?,
            harvest_date: row.get(1)?,
            schedule_id: row.get(2)?,
            plant_id: row.get(3)?,
            plant_name: row.get(4)?,
            activity_id: row.get(5)?,
            quantity_kg,
            price_per_kg,
            total_value: total_value(quantity_kg, price_per_kg),
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ===== CLI =====

#[derive(Parser, Debug)]
#[clap(name = "harvest", about = "Record and list harvest results.")]
pub struct HarvestCli {
    #[clap(subcommand)]
    pub command: HarvestCommand,
}

#[derive(Subcommand, Debug)]
pub enum HarvestCommand {
    /// Record a harvest for a schedule with status Siap Panen (995).
    Record {
        #[clap(long)]
        schedule: i64,
        /// Harvest date, YYYY-MM-DD.
        #[clap(long, value_parser = time::parse_date_arg)]
        date: NaiveDate,
        /// Quantity in kg.
        #[clap(long)]
        quantity: f64,
        /// Price per kg in Rupiah.
        #[clap(long)]
        price: f64,
    },
    /// List recorded harvests.
    List,
}

pub fn run_harvest_cli(store: &Store, cli: HarvestCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        HarvestCommand::Record {
            schedule,
            date,
            quantity,
            price,
        } => {
            let new = NewHarvest {
                schedule_id: schedule,
                harvest_date: date,
                quantity_kg: quantity,
                price_per_kg: price,
            };
            let receipt = broker.with_conn("harvest.record", |conn| record_harvest(conn, &new))?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    time::command_envelope("harvest.record", "ok", serde_json::json!({ "harvest": receipt }))
                ),
                OutputFormat::Text => {
                    tui::print_status_line("Harvest recorded", ItemStatus::Created);
                    tui::print_fields(&[
                        ("ID Panen", receipt.id.to_string()),
                        ("Tanggal Panen", receipt.harvest_date.to_string()),
                        ("Jumlah Panen", format!("{} kg", receipt.quantity_kg)),
                        ("Harga per kg", format_rupiah(receipt.price_per_kg)),
                        ("Total Nilai", format_rupiah(receipt.total_value)),
                    ]);
                }
            }
        }
        HarvestCommand::List => {
            let rows = broker.read(list_harvests)?;
            output::print_rows("HASIL PANEN", &rows, format, "No harvests recorded.")?;
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "harvest",
        "version": "0.1.0",
        "description": "Harvest results for ready schedules",
        "commands": [
            { "name": "record", "parameters": ["schedule", "date", "quantity", "price"] },
            { "name": "list" }
        ],
        "storage": ["Hasil_Panen"]
    })
}
