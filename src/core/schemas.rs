//! Centralized schema definitions for the SIPATANI record store.
//!
//! All tables live in one SQLite file. Table names keep the farm office's
//! established naming so existing reports and exports continue to line up.
//!
//! Tables with generated ids use `AUTOINCREMENT`; their `sqlite_sequence`
//! entry is seeded with a floor (see [`SEQUENCE_FLOORS`]) so the first id a
//! table issues is `floor + 1` and ids are never handed out twice.

pub const DEFAULT_DB_NAME: &str = "sipatani.db";

pub const TABLE_FARMER: &str = "Petani";
pub const TABLE_LAND: &str = "Lahan";
pub const TABLE_PLANT: &str = "Tanaman";
pub const TABLE_STATUS: &str = "Status_Jadwal";
pub const TABLE_SCHEDULE: &str = "Jadwal_Tanam";
pub const TABLE_FERTILIZATION: &str = "Jadwal_Pemupukan";
pub const TABLE_STOCK: &str = "Pupuk_Pestisida";
pub const TABLE_HARVEST: &str = "Hasil_Panen";
pub const TABLE_CROP_ISSUE: &str = "Masalah_Tanam";
pub const TABLE_REPORT: &str = "laporan_masalah";

// --- Reference data ---

pub const FARMER_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Petani (
        id_petani INTEGER PRIMARY KEY AUTOINCREMENT,
        nama_petani TEXT NOT NULL
    )
";

pub const LAND_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Lahan (
        id_lahan INTEGER PRIMARY KEY AUTOINCREMENT,
        luas_lahan REAL NOT NULL CHECK (luas_lahan > 0),
        jumlah_pegawai INTEGER NOT NULL CHECK (jumlah_pegawai >= 0),
        id_petani INTEGER NOT NULL,
        FOREIGN KEY(id_petani) REFERENCES Petani(id_petani)
    )
";

pub const PLANT_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Tanaman (
        id_tanaman INTEGER PRIMARY KEY AUTOINCREMENT,
        nama_tanaman TEXT NOT NULL,
        jarak_antar_tanaman REAL NOT NULL,
        durasi_tanam INTEGER NOT NULL
    )
";

pub const STATUS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Status_Jadwal (
        id_status_jadwal INTEGER PRIMARY KEY,
        status TEXT NOT NULL
    )
";

pub const STATUS_SEED: &str = "
    INSERT OR IGNORE INTO Status_Jadwal (id_status_jadwal, status) VALUES
        (993, 'Terjadwal'),
        (994, 'Sedang Berlangsung'),
        (995, 'Siap Panen')
";

// --- Planting operations ---

pub const SCHEDULE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Jadwal_Tanam (
        id_jadwal_tanam INTEGER PRIMARY KEY AUTOINCREMENT,
        tanggal TEXT NOT NULL,
        id_lahan INTEGER NOT NULL,
        id_tanaman INTEGER NOT NULL,
        status_jadwal_id INTEGER NOT NULL DEFAULT 993,
        FOREIGN KEY(id_lahan) REFERENCES Lahan(id_lahan),
        FOREIGN KEY(id_tanaman) REFERENCES Tanaman(id_tanaman),
        FOREIGN KEY(status_jadwal_id) REFERENCES Status_Jadwal(id_status_jadwal)
    )
";

pub const FERTILIZATION_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Jadwal_Pemupukan (
        id_kegiatan INTEGER PRIMARY KEY AUTOINCREMENT,
        nama_kegiatan TEXT NOT NULL,
        tanggal_pemupukan TEXT NOT NULL,
        dosis_per_bibit_tanaman REAL NOT NULL CHECK (dosis_per_bibit_tanaman > 0),
        id_tanaman INTEGER NOT NULL,
        FOREIGN KEY(id_tanaman) REFERENCES Tanaman(id_tanaman)
    )
";

pub const STOCK_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Pupuk_Pestisida (
        id_pupukpestisida INTEGER PRIMARY KEY AUTOINCREMENT,
        nama_barang TEXT NOT NULL,
        jenis TEXT NOT NULL CHECK (jenis IN ('Pupuk', 'Pestisida')),
        id_kegiatan INTEGER NOT NULL,
        FOREIGN KEY(id_kegiatan) REFERENCES Jadwal_Pemupukan(id_kegiatan)
    )
";

// id_kegiatan is deliberately not a foreign key: harvests fall back to the
// default activity when a plant has no fertilization history.
pub const HARVEST_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Hasil_Panen (
        id_panen INTEGER PRIMARY KEY AUTOINCREMENT,
        tanggal TEXT NOT NULL,
        jumlah_panen_kg REAL NOT NULL CHECK (jumlah_panen_kg > 0),
        harga_per_kg REAL NOT NULL CHECK (harga_per_kg > 0),
        id_tanaman INTEGER NOT NULL,
        id_jadwal_tanam INTEGER NOT NULL,
        id_kegiatan INTEGER NOT NULL,
        FOREIGN KEY(id_jadwal_tanam) REFERENCES Jadwal_Tanam(id_jadwal_tanam)
    )
";

pub const CROP_ISSUE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS Masalah_Tanam (
        id_masalah INTEGER PRIMARY KEY AUTOINCREMENT,
        id_jadwal_tanam INTEGER NOT NULL,
        tanggal TEXT NOT NULL,
        deskripsi TEXT NOT NULL,
        FOREIGN KEY(id_jadwal_tanam) REFERENCES Jadwal_Tanam(id_jadwal_tanam)
    )
";

pub const REPORT_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS laporan_masalah (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        id_jadwal_tanam INTEGER NOT NULL,
        tanggal_masalah TEXT NOT NULL,
        jenis VARCHAR(50) NOT NULL,
        deskripsi TEXT NOT NULL,
        status_penanganan VARCHAR(20) NOT NULL CHECK (status_penanganan IN ('Belum', 'Proses', 'Selesai')),
        solusi TEXT,
        FOREIGN KEY(id_jadwal_tanam) REFERENCES Jadwal_Tanam(id_jadwal_tanam)
    )
";

pub const SCHEDULE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_jadwal_tanam_status ON Jadwal_Tanam(status_jadwal_id)";
pub const HARVEST_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_hasil_panen_jadwal ON Hasil_Panen(id_jadwal_tanam)";
pub const REPORT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_laporan_masalah_jadwal ON laporan_masalah(id_jadwal_tanam)";

/// Creation order matters: referenced tables come first.
pub const ALL_SCHEMAS: &[&str] = &[
    FARMER_SCHEMA,
    LAND_SCHEMA,
    PLANT_SCHEMA,
    STATUS_SCHEMA,
    SCHEDULE_SCHEMA,
    FERTILIZATION_SCHEMA,
    STOCK_SCHEMA,
    HARVEST_SCHEMA,
    CROP_ISSUE_SCHEMA,
    REPORT_SCHEMA,
    SCHEDULE_INDEX,
    HARVEST_INDEX,
    REPORT_INDEX,
];

pub const ALL_TABLES: &[&str] = &[
    TABLE_FARMER,
    TABLE_LAND,
    TABLE_PLANT,
    TABLE_STATUS,
    TABLE_SCHEDULE,
    TABLE_FERTILIZATION,
    TABLE_STOCK,
    TABLE_HARVEST,
    TABLE_CROP_ISSUE,
    TABLE_REPORT,
];

/// `(table, floor)` pairs seeded into `sqlite_sequence`.
pub const SEQUENCE_FLOORS: &[(&str, i64)] = &[
    (TABLE_SCHEDULE, 8000),
    (TABLE_FERTILIZATION, 300),
    (TABLE_STOCK, 200),
    (TABLE_HARVEST, 5000),
];
