#![allow(dead_code)]

use rusqlite::{params, Connection};
use station_core::{RetryPolicy, Station, StoreConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub const STATIONS_DDL: &str = "CREATE TABLE Stations (
    StationId INTEGER NOT NULL,
    Name TEXT NOT NULL,
    Country TEXT NOT NULL,
    Latitude REAL NOT NULL,
    Longitude REAL NOT NULL,
    Elevation REAL
);";

pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    /// Creates a store seeded with `stations` in insertion order.
    pub fn with_stations(stations: &[Station]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.db");
        let mut conn = Connection::open(&path).unwrap();
        conn.execute_batch(STATIONS_DDL).unwrap();
        insert_stations(&mut conn, stations);
        Self { dir, path }
    }

    pub fn seeded() -> Self {
        Self::with_stations(&sample_stations())
    }

    pub fn config(&self) -> StoreConfig {
        fast_config(&self.path)
    }
}

/// Config with no busy wait and short backoff so contention tests stay fast.
pub fn fast_config(path: &Path) -> StoreConfig {
    StoreConfig::new(path)
        .with_busy_timeout(Duration::ZERO)
        .with_retry(RetryPolicy::new(3, Duration::from_millis(10)).unwrap())
}

pub fn insert_stations(conn: &mut Connection, stations: &[Station]) {
    let tx = conn.transaction().unwrap();
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO Stations (StationId, Name, Country, Latitude, Longitude, Elevation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )
            .unwrap();
        for station in stations {
            stmt.execute(params![
                station.station_id,
                station.name,
                station.country,
                station.latitude,
                station.longitude,
                station.elevation,
            ])
            .unwrap();
        }
    }
    tx.commit().unwrap();
}

pub fn station(
    station_id: i64,
    name: &str,
    country: &str,
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
) -> Station {
    Station {
        station_id,
        name: name.to_string(),
        country: country.to_string(),
        latitude,
        longitude,
        elevation,
    }
}

pub fn sample_stations() -> Vec<Station> {
    vec![
        station(1001, "Albuquerque", "USA", 34.9462, -106.4567, Some(1850.0)),
        station(2001, "Kyoto", "Japan", 35.1025, 135.7845, Some(160.0)),
        station(2002, "Matsushiro", "Japan", 36.5442, 138.2070, Some(420.0)),
        station(3001, "Valdivia", "Chile", -39.8000, -73.2400, None),
        station(2003, "Erimo", "Japan", 42.0150, 143.1572, Some(40.0)),
        station(4001, "Grafenberg", "Germany", 49.6919, 11.2217, Some(500.0)),
        station(4002, "Lowercase Entry", "germany", 50.0, 10.0, None),
        station(5001, "Dublin Bay", "O'Brien Land", 53.3, -6.2, Some(5.0)),
    ]
}

pub fn stations_table_exists(path: &Path) -> bool {
    let conn = Connection::open(path).unwrap();
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'Stations');",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

pub fn station_count(path: &Path) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM Stations;", [], |row| row.get(0))
        .unwrap()
}
