//! SIPATANI: planting-operations records for a farm.
//!
//! A local record keeper for the day-to-day work of a farm: planting
//! schedules, fertilization activities, fertilizer/pesticide stock, harvest
//! results and problem reports, stored in one SQLite database.
//!
//! # Architecture
//!
//! - Every command opens the database through [`core::broker::DbBroker`],
//!   which hands the connection to the operation explicitly and appends the
//!   outcome of each mutation to `<db-stem>.events.jsonl`.
//! - Ids come from SQLite `AUTOINCREMENT` sequences seeded with per-table
//!   floors (schedules start at 8001, harvests at 5001, fertilization
//!   activities at 301, stock items at 201).
//! - Multi-row changes (schedule cascade delete, fertilization creation and
//!   deletion, harvest recording) run in a single transaction.
//!
//! # Examples
//!
//! ```bash
//! sipatani init
//! sipatani farmer add --name "Pak Budi"
//! sipatani land add --area 2500 --employees 3 --farmer 1
//! sipatani plant add --name Padi --spacing 25 --duration 110
//! sipatani schedule add --plant 1 --land 1 --date 2025-01-10
//! sipatani schedule edit --id 8001 --field status --value 995
//! sipatani harvest record --schedule 8001 --date 2025-05-01 --quantity 120.5 --price 3500
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: storage plumbing, closed value types, config and output
//! - [`plugins`]: one module per record area

pub mod core;
pub mod plugins;

use crate::core::{
    broker, config, db,
    error::SipataniError,
    output::{self, OutputFormat},
    schemas,
    store::Store,
    time, tui,
};
use crate::plugins::{fertilization, harvest, reference, report, schedule};

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "sipatani",
    version = env!("CARGO_PKG_VERSION"),
    about = "Planting-operations records for a farm"
)]
struct Cli {
    /// Database file (overrides `database.path` from the config).
    #[clap(long, global = true)]
    db: Option<PathBuf>,
    /// Config file (defaults to ./sipatani.toml when present).
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Output format.
    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SchemaCli {
    /// Only show one record area.
    #[clap(long)]
    area: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and its tables (safe to repeat).
    Init,
    /// Show the mutation audit log.
    Audit,
    /// Describe the commands and tables of each record area as JSON.
    Schema(SchemaCli),
    /// Farmers.
    Farmer(reference::FarmerCli),
    /// Land plots.
    Land(reference::LandCli),
    /// Plant species.
    Plant(reference::PlantCli),
    /// Planting schedules.
    Schedule(schedule::ScheduleCli),
    /// Harvest results.
    Harvest(harvest::HarvestCli),
    /// Fertilization activities.
    Fertilization(fertilization::FertilizationCli),
    /// Fertilizer and pesticide stock.
    Stock(fertilization::StockCli),
    /// Problem reports.
    Report(report::ReportCli),
}

fn area_schemas() -> BTreeMap<&'static str, serde_json::Value> {
    let mut schemas = BTreeMap::new();
    schemas.insert("reference", reference::schema());
    schemas.insert("schedule", schedule::schema());
    schemas.insert("harvest", harvest::schema());
    schemas.insert("fertilization", fertilization::schema());
    schemas.insert("report", report::schema());
    schemas
}

fn run_init(store: &Store, format: OutputFormat) -> Result<(), SipataniError> {
    // Opening ensures the schema and sequence floors.
    let conn = db::open_record_db(&store.db_path)?;
    drop(conn);
    match format {
        OutputFormat::Json => println!(
            "{}",
            time::command_envelope(
                "init",
                "ok",
                serde_json::json!({
                    "db_path": store.db_path.display().to_string(),
                    "tables": schemas::ALL_TABLES,
                })
            )
        ),
        OutputFormat::Text => {
            tui::render_box(
                "SIPATANI",
                &format!("Database ready at {}", store.db_path.display()),
                tui::BoxStyle::Success,
            );
        }
    }
    Ok(())
}

pub fn run() -> Result<(), SipataniError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;
    let cfg = config::load_config(cli.config.as_deref(), &current_dir)?;
    let store = Store::from_config(&cfg, cli.db.as_deref());
    tracing::debug!(db = %store.db_path.display(), "using record store");

    let format = cli.format;
    match cli.command {
        Command::Init => run_init(&store, format)?,
        Command::Audit => {
            let events = broker::read_audit_log(&store)?;
            output::print_rows("AUDIT LOG", &events, format, "No audit events recorded.")?;
        }
        Command::Schema(schema_cli) => {
            let schemas = area_schemas();
            let out = match schema_cli.area {
                Some(area) => schemas.get(area.as_str()).cloned().ok_or_else(|| {
                    SipataniError::NotFound(format!(
                        "record area '{area}' (known: {})",
                        schemas.keys().copied().collect::<Vec<_>>().join(", ")
                    ))
                })?,
                None => serde_json::json!({
                    "schema_version": "1.0.0",
                    "areas": schemas,
                }),
            };
            let pretty = serde_json::to_string_pretty(&out).map_err(|e| SipataniError::IoError(e.into()))?;
            println!("{}", pretty);
        }
        Command::Farmer(c) => reference::run_farmer_cli(&store, c, format)?,
        Command::Land(c) => reference::run_land_cli(&store, c, format)?,
        Command::Plant(c) => reference::run_plant_cli(&store, c, format)?,
        Command::Schedule(c) => schedule::run_schedule_cli(&store, c, format)?,
        Command::Harvest(c) => harvest::run_harvest_cli(&store, c, format)?,
        Command::Fertilization(c) => fertilization::run_fertilization_cli(&store, c, format)?,
        Command::Stock(c) => fertilization::run_stock_cli(&store, c, format)?,
        Command::Report(c) => report::run_report_cli(&store, c, format)?,
    }
    Ok(())
}
