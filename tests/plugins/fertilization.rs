mod common;

use common::{count, date, seeded_farm};
use pretty_assertions::assert_eq;
use sipatani::core::error::SipataniError;
use sipatani::core::model::StockKind;
use sipatani::plugins::fertilization::{
    self, FertilizationEdit, FertilizationField, NewFertilization, NewStock,
};

fn urea(plant_id: i64) -> NewFertilization {
    NewFertilization {
        plant_id,
        kind: StockKind::Fertilizer,
        activity_name: "Pemupukan dasar".to_string(),
        item_name: "Urea".to_string(),
        interval_days: 14,
        dose_per_seedling: 2.0,
    }
}

#[test]
fn add_creates_activity_and_stock_with_floor_ids() {
    let mut farm = seeded_farm();
    let (activity_id, stock_id) =
        fertilization::add_fertilization(&mut farm.conn, &urea(farm.plant_id), date("2025-01-01"))
            .unwrap();
    assert_eq!((activity_id, stock_id), (301, 201));

    let rows = fertilization::list_fertilizations(&farm.conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].scheduled_date, date("2025-01-15"));
    assert_eq!(rows[0].plant_name, "Padi");
    assert_eq!(rows[0].kind, Some(StockKind::Fertilizer));

    let stock = fertilization::list_stock(&farm.conn).unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0].name, "Urea");
    assert_eq!(stock[0].activity_id, 301);
}

#[test]
fn add_for_unknown_plant_writes_nothing() {
    let mut farm = seeded_farm();
    let err = fertilization::add_fertilization(&mut farm.conn, &urea(404), date("2025-01-01"))
        .unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(_)));
    assert_eq!(count(&farm.conn, "Jadwal_Pemupukan"), 0);
    assert_eq!(count(&farm.conn, "Pupuk_Pestisida"), 0);
}

#[test]
fn zero_interval_is_rejected_before_any_write() {
    let mut farm = seeded_farm();
    let same_day = NewFertilization {
        interval_days: 0,
        ..urea(farm.plant_id)
    };
    let err = fertilization::add_fertilization(&mut farm.conn, &same_day, date("2025-01-01"))
        .unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(ref msg) if msg.contains("interval")));
    assert_eq!(count(&farm.conn, "Jadwal_Pemupukan"), 0);
    assert_eq!(count(&farm.conn, "Pupuk_Pestisida"), 0);

    let next_day = NewFertilization {
        interval_days: 1,
        ..urea(farm.plant_id)
    };
    fertilization::add_fertilization(&mut farm.conn, &next_day, date("2025-01-01")).unwrap();
    let rows = fertilization::list_fertilizations(&farm.conn).unwrap();
    assert_eq!(rows[0].scheduled_date, date("2025-01-02"));
}

#[test]
fn failed_stock_insert_rolls_back_the_activity() {
    let mut farm = seeded_farm();
    farm.conn.execute("DROP TABLE Pupuk_Pestisida", []).unwrap();

    let err = fertilization::add_fertilization(&mut farm.conn, &urea(farm.plant_id), date("2025-01-01"))
        .unwrap_err();
    assert!(err.is_storage());
    assert_eq!(count(&farm.conn, "Jadwal_Pemupukan"), 0);
}

#[test]
fn stock_must_reference_a_listed_activity() {
    let mut farm = seeded_farm();
    let (activity_id, _) =
        fertilization::add_fertilization(&mut farm.conn, &urea(farm.plant_id), date("2025-01-01"))
            .unwrap();

    let unlisted = NewStock {
        name: "Furadan".to_string(),
        kind: StockKind::Pesticide,
        activity_id: 999,
    };
    let err = fertilization::add_stock(&farm.conn, &unlisted).unwrap_err();
    assert!(matches!(err, SipataniError::ValidationError(_)));

    let listed = NewStock {
        activity_id,
        ..unlisted
    };
    let id = fertilization::add_stock(&farm.conn, &listed).unwrap();
    assert_eq!(id, 202);
    assert_eq!(fertilization::list_activity_ids(&farm.conn).unwrap(), vec![301]);
}

#[test]
fn edit_updates_date_and_dose() {
    let mut farm = seeded_farm();
    let (activity_id, _) =
        fertilization::add_fertilization(&mut farm.conn, &urea(farm.plant_id), date("2025-01-01"))
            .unwrap();

    let edit = FertilizationEdit::parse(FertilizationField::Dose, "3.25").unwrap();
    fertilization::edit_fertilization(&farm.conn, activity_id, &edit).unwrap();
    let edit = FertilizationEdit::parse(FertilizationField::Date, "2025-02-01").unwrap();
    fertilization::edit_fertilization(&farm.conn, activity_id, &edit).unwrap();

    let row = &fertilization::list_fertilizations(&farm.conn).unwrap()[0];
    assert_eq!(row.dose_per_seedling, 3.25);
    assert_eq!(row.scheduled_date, date("2025-02-01"));

    let err = fertilization::edit_fertilization(&farm.conn, 999, &FertilizationEdit::Dose(1.0))
        .unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
}

#[test]
fn delete_activity_takes_its_stock_along() {
    let mut farm = seeded_farm();
    let (activity_id, _) =
        fertilization::add_fertilization(&mut farm.conn, &urea(farm.plant_id), date("2025-01-01"))
            .unwrap();
    fertilization::add_stock(
        &farm.conn,
        &NewStock {
            name: "NPK".to_string(),
            kind: StockKind::Fertilizer,
            activity_id,
        },
    )
    .unwrap();

    let removed = fertilization::delete_fertilization(&mut farm.conn, activity_id).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(count(&farm.conn, "Jadwal_Pemupukan"), 0);
    assert_eq!(count(&farm.conn, "Pupuk_Pestisida"), 0);

    let err = fertilization::delete_fertilization(&mut farm.conn, activity_id).unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
    let err = fertilization::require_activity(&farm.conn, activity_id).unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
}

#[test]
fn delete_stock_removes_one_row() {
    let mut farm = seeded_farm();
    let (_, stock_id) =
        fertilization::add_fertilization(&mut farm.conn, &urea(farm.plant_id), date("2025-01-01"))
            .unwrap();
    fertilization::require_stock(&farm.conn, stock_id).unwrap();
    fertilization::delete_stock(&farm.conn, stock_id).unwrap();
    assert_eq!(count(&farm.conn, "Pupuk_Pestisida"), 0);
    assert_eq!(count(&farm.conn, "Jadwal_Pemupukan"), 1);

    let err = fertilization::delete_stock(&farm.conn, stock_id).unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
    let err = fertilization::require_stock(&farm.conn, stock_id).unwrap_err();
    assert!(matches!(err, SipataniError::NotFound(_)));
}

#[test]
fn stock_kind_accepts_both_languages() {
    assert_eq!("Pupuk".parse::<StockKind>(), Ok(StockKind::Fertilizer));
    assert_eq!("pesticide".parse::<StockKind>(), Ok(StockKind::Pesticide));
    assert!("herbisida".parse::<StockKind>().is_err());
}
