#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use sipatani::core::db;
use sipatani::core::model::ScheduleStatus;
use sipatani::plugins::reference::{self, NewLand, NewPlant};
use sipatani::plugins::schedule::{self, NewSchedule};
use tempfile::{TempDir, tempdir};

pub struct Farm {
    pub dir: TempDir,
    pub conn: Connection,
    pub farmer_id: i64,
    pub land_id: i64,
    pub plant_id: i64,
    pub schedule_id: i64,
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
}

pub fn open_db() -> (TempDir, Connection) {
    let dir = tempdir().expect("tempdir");
    let conn = db::open_record_db(&dir.path().join("farm.db")).expect("open db");
    (dir, conn)
}

/// One farmer, one plot, one plant (Padi) and one planting schedule.
pub fn seeded_farm() -> Farm {
    let (dir, conn) = open_db();
    let farmer_id = reference::add_farmer(&conn, None, "Pak Budi").expect("farmer");
    let land_id = reference::add_land(
        &conn,
        &NewLand {
            id: None,
            area_m2: 2500.0,
            employees: 3,
            farmer_id,
        },
    )
    .expect("land");
    let plant_id = reference::add_plant(
        &conn,
        &NewPlant {
            id: None,
            name: "Padi".to_string(),
            spacing_cm: 25.0,
            duration_days: 110,
        },
    )
    .expect("plant");
    let schedule_id = schedule::add_schedule(
        &conn,
        &NewSchedule {
            plant_id,
            land_id,
            planting_date: date("2025-01-10"),
        },
    )
    .expect("schedule");
    Farm {
        dir,
        conn,
        farmer_id,
        land_id,
        plant_id,
        schedule_id,
    }
}

pub fn set_status(conn: &Connection, schedule_id: i64, status: ScheduleStatus) {
    conn.execute(
        "UPDATE Jadwal_Tanam SET status_jadwal_id = ?1 WHERE id_jadwal_tanam = ?2",
        params![status, schedule_id],
    )
    .expect("set status");
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count")
}
