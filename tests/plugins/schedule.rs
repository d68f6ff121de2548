mod common;

use common::{count, date, seeded_farm, set_status};
use pretty_assertions::assert_eq;
use rusqlite::params;
use sipatani::core::error::SipataniError;
use sipatani::core::model::{HandlingStatus, ScheduleStatus};
use sipatani::plugins::harvest::{self, NewHarvest};
use sipatani::plugins::report::{self, ReportInput};
use sipatani::plugins::schedule::{
    self, Dependents, NewSchedule, ScheduleEdit, ScheduleField,
};

#[test]
fn new_schedule_gets_first_id_above_floor_and_default_status() {
    let farm = seeded_farm();
    assert_eq!(farm.schedule_id, 8001);

    let row = schedule::get_schedule(&farm.conn, farm.schedule_id)
        .unwrap()
        .expect("schedule exists");
    assert_eq!(row.status, ScheduleStatus::Scheduled);
    assert_eq!(row.plant_name, "Padi");
    assert_eq!(row.planting_date, date("2025-01-10"));
    assert_eq!(row.employees, 3);
    assert!(schedule::list_ready_schedules(&farm.conn).unwrap().is_empty());
}

#[test]
fn add_rejects_plant_or_land_outside_the_offered_lists() {
    let farm = seeded_farm();
    let bad_plant = NewSchedule {
        plant_id: 99,
        land_id: farm.land_id,
        planting_date: date("2025-02-01"),
    };
    let err = schedule::add_schedule(&farm.conn, &bad_plant).unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(_)));

    let bad_land = NewSchedule {
        plant_id: farm.plant_id,
        land_id: 42,
        planting_date: date("2025-02-01"),
    };
    let err = schedule::add_schedule(&farm.conn, &bad_land).unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(_)));

    assert_eq!(count(&farm.conn, "Jadwal_Tanam"), 1);
}

#[test]
fn edit_status_moves_schedule_into_ready_list() {
    let farm = seeded_farm();
    let edit = ScheduleEdit::parse(ScheduleField::Status, "995").unwrap();
    schedule::edit_schedule(&farm.conn, farm.schedule_id, &edit).unwrap();

    let ready = schedule::list_ready_schedules(&farm.conn).unwrap();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].id, farm.schedule_id);
    assert_eq!(ready[0].status, ScheduleStatus::ReadyToHarvest);
}

#[test]
fn edit_date_changes_only_the_date() {
    let farm = seeded_farm();
    let edit = ScheduleEdit::parse(ScheduleField::Date, "2025-03-15").unwrap();
    schedule::edit_schedule(&farm.conn, farm.schedule_id, &edit).unwrap();

    let row = schedule::get_schedule(&farm.conn, farm.schedule_id)
        .unwrap()
        .unwrap();
    assert_eq!(row.planting_date, date("2025-03-15"));
    assert_eq!(row.land_id, farm.land_id);
    assert_eq!(row.status, ScheduleStatus::Scheduled);
}

#[test]
fn invalid_edit_values_are_rejected_before_any_write() {
    assert!(ScheduleEdit::parse(ScheduleField::Status, "996").is_err());
    assert!(ScheduleEdit::parse(ScheduleField::Date, "15/03/2025").is_err());
    assert!(ScheduleEdit::parse(ScheduleField::Land, "satu").is_err());

    let farm = seeded_farm();
    let err = schedule::edit_schedule(&farm.conn, farm.schedule_id, &ScheduleEdit::Land(77))
        .unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(_)));
    let row = schedule::get_schedule(&farm.conn, farm.schedule_id)
        .unwrap()
        .unwrap();
    assert_eq!(row.land_id, farm.land_id);
}

#[test]
fn editing_missing_schedule_is_not_found() {
    let farm = seeded_farm();
    let err = schedule::edit_schedule(
        &farm.conn,
        9999,
        &ScheduleEdit::Status(ScheduleStatus::InProgress),
    )
    .unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
}

#[test]
fn delete_without_dependents_does_not_ask() {
    let mut farm = seeded_farm();
    let mut asked = false;
    let removed = schedule::delete_schedule(&mut farm.conn, farm.schedule_id, |_| {
        asked = true;
        Ok(true)
    })
    .unwrap();
    assert!(!asked);
    assert_eq!(removed, Dependents::default());
    assert_eq!(count(&farm.conn, "Jadwal_Tanam"), 0);
}

fn add_dependents(farm: &mut common::Farm) {
    set_status(&farm.conn, farm.schedule_id, ScheduleStatus::ReadyToHarvest);
    harvest::record_harvest(
        &mut farm.conn,
        &NewHarvest {
            schedule_id: farm.schedule_id,
            harvest_date: date("2025-05-01"),
            quantity_kg: 50.0,
            price_per_kg: 4000.0,
        },
    )
    .unwrap();
    report::add_report(
        &farm.conn,
        &ReportInput {
            schedule_id: farm.schedule_id,
            reported_on: date("2025-02-20"),
            kind: "hama".to_string(),
            description: "Wereng coklat".to_string(),
            status: HandlingStatus::Proses,
            solution: None,
        },
    )
    .unwrap();
    farm.conn
        .execute(
            "INSERT INTO Masalah_Tanam (id_jadwal_tanam, tanggal, deskripsi) VALUES (?1, ?2, ?3)",
            params![farm.schedule_id, date("2025-02-21"), "Daun menguning"],
        )
        .unwrap();
}

#[test]
fn refused_cascade_leaves_everything_in_place() {
    let mut farm = seeded_farm();
    add_dependents(&mut farm);

    let mut seen = None;
    let err = schedule::delete_schedule(&mut farm.conn, farm.schedule_id, |deps| {
        seen = Some(*deps);
        Ok(false)
    })
    .unwrap_err();
    assert!(matches!(err, SipataniError::RuleViolation(_)));
    assert_eq!(
        seen,
        Some(Dependents {
            harvests: 1,
            reports: 1,
            crop_issues: 1,
        })
    );

    assert_eq!(count(&farm.conn, "Jadwal_Tanam"), 1);
    assert_eq!(count(&farm.conn, "Hasil_Panen"), 1);
    assert_eq!(count(&farm.conn, "laporan_masalah"), 1);
    assert_eq!(count(&farm.conn, "Masalah_Tanam"), 1);
}

#[test]
fn confirmed_cascade_removes_dependents_and_schedule() {
    let mut farm = seeded_farm();
    add_dependents(&mut farm);

    let removed = schedule::delete_schedule(&mut farm.conn, farm.schedule_id, |_| Ok(true)).unwrap();
    assert_eq!(removed.total(), 3);

    for table in ["Jadwal_Tanam", "Hasil_Panen", "laporan_masalah", "Masalah_Tanam"] {
        assert_eq!(count(&farm.conn, table), 0, "{table} should be empty");
    }
}

#[test]
fn failure_mid_cascade_rolls_every_table_back() {
    let mut farm = seeded_farm();
    add_dependents(&mut farm);
    // Dependents are already gone by the time the schedule row fails.
    farm.conn
        .execute_batch(
            "CREATE TRIGGER keep_schedules BEFORE DELETE ON Jadwal_Tanam
             BEGIN SELECT RAISE(ABORT, 'schedule rows are locked'); END;",
        )
        .unwrap();

    let err = schedule::delete_schedule(&mut farm.conn, farm.schedule_id, |_| Ok(true)).unwrap_err();
    assert!(err.is_storage());
    assert!(err.to_string().contains("schedule rows are locked"));

    for table in ["Jadwal_Tanam", "Hasil_Panen", "laporan_masalah", "Masalah_Tanam"] {
        assert_eq!(count(&farm.conn, table), 1, "{table} should keep its row");
    }
}

#[test]
fn confirmation_error_is_returned_unchanged() {
    let mut farm = seeded_farm();
    add_dependents(&mut farm);

    let err = schedule::delete_schedule(&mut farm.conn, farm.schedule_id, |_| {
        Err(SipataniError::Cancelled("no terminal".to_string()))
    })
    .unwrap_err();
    assert!(matches!(err, SipataniError::Cancelled(ref msg) if msg == "no terminal"));
    assert_eq!(count(&farm.conn, "Jadwal_Tanam"), 1);
    assert_eq!(count(&farm.conn, "Hasil_Panen"), 1);
}

#[test]
fn deleting_missing_schedule_is_not_found() {
    let mut farm = seeded_farm();
    let err = schedule::delete_schedule(&mut farm.conn, 8500, |_| Ok(true)).unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
}

#[test]
fn deleted_schedule_ids_are_not_reused() {
    let mut farm = seeded_farm();
    schedule::delete_schedule(&mut farm.conn, farm.schedule_id, |_| Ok(true)).unwrap();
    let next = schedule::add_schedule(
        &farm.conn,
        &NewSchedule {
            plant_id: farm.plant_id,
            land_id: farm.land_id,
            planting_date: date("2025-06-01"),
        },
    )
    .unwrap();
    assert_eq!(next, 8002);
}
