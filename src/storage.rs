//! Local persistence for drivers and trips.
//!
//! Everything lives in one `SQLite` file under the storage root:
//!
//! ```text
//! <root>/
//!   haul.sqlite      # driver + trip tables
//!   config.toml      # optional, see `config`
//! ```
//!
//! A driver's cycle ledger is updated read-modify-write, so trip recording
//! runs in an `IMMEDIATE` transaction (see [`Storage::record_trip`]) and every
//! connection waits on a busy timeout instead of failing when another
//! process holds the write lock.

mod driver;
mod trip;

use std::{fs, io, path::PathBuf, time::Duration};

use rusqlite::Connection;
use uuid::Uuid;

use crate::config;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("driver not found: {0}")]
    DriverNotFound(Uuid),

    #[error("trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const DB_FILE: &str = "haul.sqlite";
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS driver (
    id               TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    cycle_hours_used REAL NOT NULL,
    cycle_started_on TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trip (
    id                 TEXT PRIMARY KEY,
    driver_id          TEXT REFERENCES driver(id),
    current_location   TEXT NOT NULL,
    pickup_location    TEXT NOT NULL,
    dropoff_location   TEXT NOT NULL,
    cycle_hours_before REAL NOT NULL,
    cycle_hours_used   REAL NOT NULL,
    distance_miles     REAL NOT NULL,
    outcome            TEXT NOT NULL,
    route              TEXT NOT NULL,
    logs               TEXT NOT NULL,
    fuel_stops         TEXT NOT NULL,
    eld_form           TEXT NOT NULL,
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS trip_by_driver ON trip (driver_id);
";

/// `SQLite`-backed storage for drivers and trips.
pub struct Storage {
    db_path: PathBuf,
}

impl Storage {
    /// Creates a storage instance rooted at the given directory.
    ///
    /// The directory and schema are created if they don't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let storage = Self {
            db_path: root.join(DB_FILE),
        };
        storage.open()?.execute_batch(SCHEMA)?;
        Ok(storage)
    }

    /// Returns the default storage root: `$HAUL_HOME` or `~/.haul/`.
    pub fn default_root() -> Option<PathBuf> {
        config::home()
    }

    /// Opens a fresh connection. Connections are per call so `Storage`
    /// can be shared across threads.
    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}

/// Parses a UUID column.
fn parse_id(raw: &str, column: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}

/// Parses a timestamp column.
fn parse_timestamp(raw: &str, column: &str) -> Result<jiff::Timestamp> {
    raw.parse()
        .map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}
