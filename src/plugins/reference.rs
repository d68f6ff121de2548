//! Reference data: farmers, land plots and plant species.
//!
//! Schedules and fertilization activities pick their land and plant ids from
//! these lists, so they are registered here first.

use crate::core::broker::DbBroker;
use crate::core::error::SipataniError;
use crate::core::output::{self, OutputFormat, TableRow};
use crate::core::store::Store;
use crate::core::time;
use crate::core::tui::{self, ItemStatus};
use crate::plugins::require_positive;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farmer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Land {
    pub id: i64,
    pub area_m2: f64,
    pub employees: i64,
    pub farmer_id: i64,
    pub farmer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub spacing_cm: f64,
    pub duration_days: i64,
}

#[derive(Debug, Clone)]
pub struct NewLand {
    pub id: Option<i64>,
    pub area_m2: f64,
    pub employees: i64,
    pub farmer_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewPlant {
    pub id: Option<i64>,
    pub name: String,
    pub spacing_cm: f64,
    pub duration_days: i64,
}

impl TableRow for Farmer {
    fn headers() -> Vec<&'static str> {
        vec!["ID Petani", "Nama Petani"]
    }
    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

impl TableRow for Land {
    fn headers() -> Vec<&'static str> {
        vec!["ID Lahan", "Luas (m²)", "Jumlah Pegawai", "ID Petani", "Petani"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.area_m2.to_string(),
            self.employees.to_string(),
            self.farmer_id.to_string(),
            self.farmer_name.clone(),
        ]
    }
}

impl TableRow for Plant {
    fn headers() -> Vec<&'static str> {
        vec!["ID Tanaman", "Nama Tanaman", "Jarak (cm)", "Durasi (hari)"]
    }
    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.spacing_cm.to_string(),
            self.duration_days.to_string(),
        ]
    }
}

fn require_name(name: &str, what: &str) -> Result<String, SipataniError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SipataniError::ValidationError(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub fn add_farmer(conn: &Connection, id: Option<i64>, name: &str) -> Result<i64, SipataniError> {
    let name = require_name(name, "farmer name")?;
    conn.execute(
        "INSERT INTO Petani (id_petani, nama_petani) VALUES (?1, ?2)",
        params![id, name],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(farmer_id = id, "farmer registered");
    Ok(id)
}

pub fn list_farmers(conn: &Connection) -> Result<Vec<Farmer>, SipataniError> {
    let mut stmt = conn.prepare("SELECT id_petani, nama_petani FROM Petani ORDER BY id_petani")?;
    let rows = stmt.query_map([], |row| {
        Ok(Farmer {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn add_land(conn: &Connection, land: &NewLand) -> Result<i64, SipataniError> {
    require_positive(land.area_m2, "land area")?;
    if land.employees < 0 {
        return Err(SipataniError::ValidationError(
            "employee count must not be negative".to_string(),
        ));
    }
    let farmers = list_farmers(conn)?;
    if !farmers.iter().any(|f| f.id == land.farmer_id) {
        return Err(SipataniError::ValidationError(format!(
            "farmer {} is not registered",
            land.farmer_id
        )));
    }

    conn.execute(
        "INSERT INTO Lahan (id_lahan, luas_lahan, jumlah_pegawai, id_petani) VALUES (?1, ?2, ?3, ?4)",
        params![land.id, land.area_m2, land.employees, land.farmer_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(land_id = id, farmer_id = land.farmer_id, "land registered");
    Ok(id)
}

pub fn list_land(conn: &Connection) -> Result<Vec<Land>, SipataniError> {
    let mut stmt = conn.prepare(
        "SELECT l.id_lahan, l.luas_lahan, l.jumlah_pegawai, l.id_petani, p.nama_petani
         FROM Lahan l
         JOIN Petani p ON l.id_petani = p.id_petani
         ORDER BY l.id_lahan",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Land {
            id: row.get(0)?,
            area_m2: row.get(1)?,
            employees: row.get(2)?,
            farmer_id: row.get(3)?,
            farmer_name: row.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn add_plant(conn: &Connection, plant: &NewPlant) -> Result<i64, SipataniError> {
    let name = require_name(&plant.name, "plant name")?;
    require_positive(plant.spacing_cm, "plant spacing")?;
    if plant.duration_days <= 0 {
        return Err(SipataniError::ValidationError(
            "growth duration must be at least one day".to_string(),
        ));
    }
    conn.execute(
        "INSERT INTO Tanaman (id_tanaman, nama_tanaman, jarak_antar_tanaman, durasi_tanam)
         VALUES (?1, ?2, ?3, ?4)",
        params![plant.id, name, plant.spacing_cm, plant.duration_days],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(plant_id = id, "plant registered");
    Ok(id)
}

/// Plants ordered by name, the order operators pick from.
pub fn list_plants(conn: &Connection) -> Result<Vec<Plant>, SipataniError> {
    let mut stmt = conn.prepare(
        "SELECT id_tanaman, nama_tanaman, jarak_antar_tanaman, durasi_tanam
         FROM Tanaman ORDER BY nama_tanaman, id_tanaman",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Plant {
            id: row.get(0)?,
            name: row.get(1)?,
            spacing_cm: row.get(2)?,
            duration_days: row.get(3)?,
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
#[clap(name = "farmer", about = "Register and list farmers.")]
pub struct FarmerCli {
    #[clap(subcommand)]
    pub command: FarmerCommand,
}

#[derive(Subcommand, Debug)]
pub enum FarmerCommand {
    /// Register a farmer.
    Add {
        #[clap(long)]
        name: String,
        /// Explicit id (defaults to the next free one).
        #[clap(long)]
        id: Option<i64>,
    },
    /// List farmers.
    List,
}

#[derive(Parser, Debug)]
#[clap(name = "land", about = "Register and list land plots.")]
pub struct LandCli {
    #[clap(subcommand)]
    pub command: LandCommand,
}

#[derive(Subcommand, Debug)]
pub enum LandCommand {
    /// Register a land plot owned by a farmer.
    Add {
        /// Area in square meters.
        #[clap(long)]
        area: f64,
        #[clap(long, default_value_t = 0)]
        employees: i64,
        #[clap(long)]
        farmer: i64,
        #[clap(long)]
        id: Option<i64>,
    },
    /// List land plots with their owners.
    List,
}

#[derive(Parser, Debug)]
#[clap(name = "plant", about = "Register and list plant species.")]
pub struct PlantCli {
    #[clap(subcommand)]
    pub command: PlantCommand,
}

#[derive(Subcommand, Debug)]
pub enum PlantCommand {
    /// Register a plant species.
    Add {
        #[clap(long)]
        name: String,
        /// Spacing between plants in centimeters.
        #[clap(long)]
        spacing: f64,
        /// Growth duration in days.
        #[clap(long)]
        duration: i64,
        #[clap(long)]
        id: Option<i64>,
    },
    /// List plant species.
    List,
}

fn report_created(format: OutputFormat, cmd: &str, what: &str, id: i64) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            time::command_envelope(cmd, "ok", serde_json::json!({ "id": id }))
        ),
        OutputFormat::Text => {
            tui::print_status_line(&format!("{what} {id} registered"), ItemStatus::Created)
        }
    }
}

pub fn run_farmer_cli(store: &Store, cli: FarmerCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        FarmerCommand::Add { name, id } => {
            let id = broker.with_conn("farmer.add", |conn| add_farmer(conn, id, &name))?;
            report_created(format, "farmer.add", "Farmer", id);
        }
        FarmerCommand::List => {
            let rows = broker.read(list_farmers)?;
            output::print_rows("DAFTAR PETANI", &rows, format, "No farmers registered.")?;
        }
    }
    Ok(())
}

pub fn run_land_cli(store: &Store, cli: LandCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        LandCommand::Add {
            area,
            employees,
            farmer,
            id,
        } => {
            let new_land = NewLand {
                id,
                area_m2: area,
                employees,
                farmer_id: farmer,
            };
            let id = broker.with_conn("land.add", |conn| add_land(conn, &new_land))?;
            report_created(format, "land.add", "Land", id);
        }
        LandCommand::List => {
            let rows = broker.read(list_land)?;
            output::print_rows("DAFTAR LAHAN", &rows, format, "No land registered.")?;
        }
    }
    Ok(())
}

pub fn run_plant_cli(store: &Store, cli: PlantCli, format: OutputFormat) -> Result<(), SipataniError> {
    let broker = DbBroker::new(store);
    match cli.command {
        PlantCommand::Add {
            name,
            spacing,
            duration,
            id,
        } => {
            let new_plant = NewPlant {
                id,
                name,
                spacing_cm: spacing,
                duration_days: duration,
            };
            let id = broker.with_conn("plant.add", |conn| add_plant(conn, &new_plant))?;
            report_created(format, "plant.add", "Plant", id);
        }
        PlantCommand::List => {
            let rows = broker.read(list_plants)?;
            output::print_rows("DAFTAR TANAMAN", &rows, format, "No plants registered.")?;
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "reference",
        "version": "0.1.0",
        "description": "Farmers, land plots and plant species",
        "commands": [
            { "name": "farmer add", "parameters": ["name", "id"] },
            { "name": "land add", "parameters": ["area", "employees", "farmer", "id"] },
            { "name": "plant add", "parameters": ["name", "spacing", "duration", "id"] }
        ],
        "storage": ["Petani", "Lahan", "Tanaman"]
    })
}
