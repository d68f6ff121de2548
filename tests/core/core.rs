use pretty_assertions::assert_eq;
use rusqlite::{Connection, params};
use sipatani::core::broker::{self, DbBroker};
use sipatani::core::config::{self, CONFIG_FILE_NAME};
use sipatani::core::db;
use sipatani::core::error::SipataniError;
use sipatani::core::ids::{self, Sequence};
use sipatani::core::store::Store;
use sipatani::plugins::reference::{self, NewLand, NewPlant};
use sipatani::plugins::schedule::{self, NewSchedule};
use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

fn sequence(conn: &Connection, table: &str) -> i64 {
    conn.query_row(
        "SELECT seq FROM sqlite_sequence WHERE name = ?1",
        params![table],
        |row| row.get(0),
    )
    .expect("sequence row")
}

fn register_plot(conn: &Connection) -> (i64, i64) {
    let farmer_id = reference::add_farmer(conn, None, "Bu Sari").unwrap();
    let land_id = reference::add_land(
        conn,
        &NewLand {
            id: None,
            area_m2: 1200.0,
            employees: 2,
            farmer_id,
        },
    )
    .unwrap();
    let plant_id = reference::add_plant(
        conn,
        &NewPlant {
            id: None,
            name: "Jagung".to_string(),
            spacing_cm: 40.0,
            duration_days: 95,
        },
    )
    .unwrap();
    (land_id, plant_id)
}

fn new_schedule(land_id: i64, plant_id: i64) -> NewSchedule {
    NewSchedule {
        plant_id,
        land_id,
        planting_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
    }
}

#[test]
fn schema_is_idempotent_and_seeds_statuses_and_floors() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("farm.db");

    let conn = db::open_record_db(&path).unwrap();
    db::ensure_schema(&conn).unwrap();
    drop(conn);
    let conn = db::open_record_db(&path).unwrap();

    let statuses: i64 = conn
        .query_row("SELECT COUNT(*) FROM Status_Jadwal", [], |row| row.get(0))
        .unwrap();
    assert_eq!(statuses, 3);
    assert_eq!(sequence(&conn, "Jadwal_Tanam"), 8000);
    assert_eq!(sequence(&conn, "Jadwal_Pemupukan"), 300);
    assert_eq!(sequence(&conn, "Pupuk_Pestisida"), 200);
    assert_eq!(sequence(&conn, "Hasil_Panen"), 5000);
}

#[test]
fn peek_next_id_on_empty_database() {
    let tmp = tempdir().expect("tempdir");
    let conn = db::open_record_db(&tmp.path().join("farm.db")).unwrap();

    let expected = [
        (Sequence::Schedule, 8001),
        (Sequence::FertilizationActivity, 301),
        (Sequence::Stock, 201),
        (Sequence::Harvest, 5001),
        (Sequence::Farmer, 1),
        (Sequence::Land, 1),
        (Sequence::Plant, 1),
        (Sequence::Report, 1),
        (Sequence::CropIssue, 1),
    ];
    for (seq, next) in expected {
        assert_eq!(ids::peek_next_id(&conn, seq).unwrap(), next, "{seq:?}");
    }
}

#[test]
fn explicit_high_id_moves_the_sequence_forward() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("farm.db");
    let conn = db::open_record_db(&path).unwrap();
    let (land_id, plant_id) = register_plot(&conn);

    conn.execute(
        "INSERT INTO Jadwal_Tanam (id_jadwal_tanam, tanggal, id_lahan, id_tanaman)
         VALUES (8005, '2025-03-01', ?1, ?2)",
        params![land_id, plant_id],
    )
    .unwrap();
    assert_eq!(ids::peek_next_id(&conn, Sequence::Schedule).unwrap(), 8006);
    drop(conn);

    // Reopening must not pull the sequence back to the floor.
    let conn = db::open_record_db(&path).unwrap();
    let id = schedule::add_schedule(&conn, &new_schedule(land_id, plant_id)).unwrap();
    assert_eq!(id, 8006);
}

#[test]
fn deleted_top_id_is_never_reissued() {
    let tmp = tempdir().expect("tempdir");
    let mut conn = db::open_record_db(&tmp.path().join("farm.db")).unwrap();
    let (land_id, plant_id) = register_plot(&conn);

    let first = schedule::add_schedule(&conn, &new_schedule(land_id, plant_id)).unwrap();
    let second = schedule::add_schedule(&conn, &new_schedule(land_id, plant_id)).unwrap();
    assert_eq!((first, second), (8001, 8002));

    schedule::delete_schedule(&mut conn, second, |_| Ok(true)).unwrap();
    assert_eq!(ids::peek_next_id(&conn, Sequence::Schedule).unwrap(), 8003);
    let third = schedule::add_schedule(&conn, &new_schedule(land_id, plant_id)).unwrap();
    assert_eq!(third, 8003);
}

#[test]
fn broker_audits_mutations_but_not_reads() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(&tmp.path().join("records").join("farm.db"));
    let broker = DbBroker::new(&store);

    let id = broker
        .with_conn("farmer.add", |conn| reference::add_farmer(conn, None, "Pak Harto"))
        .unwrap();
    assert_eq!(id, 1);
    let farmers = broker.read(reference::list_farmers).unwrap();
    assert_eq!(farmers.len(), 1);

    let err = broker
        .with_conn("farmer.add", |conn| reference::add_farmer(conn, None, "  "))
        .unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(_)));

    assert_eq!(
        store.audit_log_path,
        tmp.path().join("records").join("farm.events.jsonl")
    );
    let events = broker::read_audit_log(&store).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].op, "farmer.add");
    assert_eq!(events[0].status, "success");
    assert_eq!(events[0].db_id, "farm.db");
    assert_eq!(events[0].actor, "operator");
    assert_eq!(events[1].status, "error");
    assert!(events[1].error.as_deref().unwrap_or_default().contains("farmer name"));
    assert_ne!(events[0].event_id, events[1].event_id);
}

#[test]
fn broker_skips_audit_when_disabled() {
    let tmp = tempdir().expect("tempdir");
    let mut store = Store::new(&tmp.path().join("farm.db"));
    store.audit_enabled = false;

    DbBroker::new(&store)
        .with_conn("farmer.add", |conn| reference::add_farmer(conn, None, "Pak Joko"))
        .unwrap();
    assert!(!store.audit_log_path.exists());
    assert!(broker::read_audit_log(&store).unwrap().is_empty());
}

#[test]
fn config_file_resolves_relative_database_path() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[database]\npath = \"data/kebun.db\"\n\n[audit]\nactor = \"mandor\"\n",
    )
    .unwrap();

    let cfg = config::load_config(None, tmp.path()).unwrap();
    assert_eq!(cfg.database.path, tmp.path().join("data").join("kebun.db"));
    assert!(cfg.audit.enabled);
    assert_eq!(cfg.audit.actor, "mandor");

    let store = Store::from_config(&cfg, None);
    assert_eq!(store.db_path, tmp.path().join("data").join("kebun.db"));
    assert_eq!(store.actor, "mandor");

    let override_path = tmp.path().join("other.db");
    let store = Store::from_config(&cfg, Some(override_path.as_path()));
    assert_eq!(store.db_path, override_path);
    assert_eq!(store.audit_log_path, tmp.path().join("other.events.jsonl"));
}

#[test]
fn config_missing_default_file_means_defaults_but_explicit_must_exist() {
    let tmp = tempdir().expect("tempdir");
    let cfg = config::load_config(None, tmp.path()).unwrap();
    assert_eq!(cfg.database.path, std::path::PathBuf::from("sipatani.db"));

    let err = config::load_config(Some(tmp.path().join("nope.toml").as_path()), tmp.path()).unwrap_err();
    assert!(matches!(err, SipataniError::ConfigError(_)));

    fs::write(tmp.path().join("bad.toml"), "[database\npath = 3").unwrap();
    let err = config::load_config(Some(tmp.path().join("bad.toml").as_path()), tmp.path()).unwrap_err();
    assert!(matches!(err, SipataniError::ConfigError(_)));
}
