//! Driver storage: create, load, list, and reset the cycle ledger.

use jiff::civil::Date;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::model::Driver;

use super::{Result, Storage, StorageError, parse_id, parse_timestamp};

const SELECT_DRIVER: &str =
    "SELECT id, name, cycle_hours_used, cycle_started_on, created_at FROM driver";

impl Storage {
    /// Inserts a new driver.
    pub fn create_driver(&self, driver: &Driver) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO driver (id, name, cycle_hours_used, cycle_started_on, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                driver.id.to_string(),
                &driver.name,
                driver.cycle_hours_used,
                driver.cycle_started_on.to_string(),
                driver.created_at.to_string(),
            ],
        )?;
        debug!(id = %driver.id, name = %driver.name, "created driver");
        Ok(())
    }

    /// Loads a single driver.
    pub fn load_driver(&self, id: Uuid) -> Result<Driver> {
        load_driver_row(&self.open()?, id)
    }

    /// Lists all drivers, oldest first.
    pub fn list_drivers(&self) -> Result<Vec<Driver>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(SELECT_DRIVER)?;
        let rows = stmt
            .query_map([], DriverRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut drivers = rows
            .into_iter()
            .map(DriverRow::into_driver)
            .collect::<Result<Vec<_>>>()?;
        drivers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(drivers)
    }

    /// Starts a fresh cycle for a driver on the given day.
    pub fn reset_cycle(&self, id: Uuid, on: Date) -> Result<Driver> {
        let conn = self.open()?;
        let rows = conn.execute(
            "UPDATE driver SET cycle_hours_used = 0, cycle_started_on = ?1 WHERE id = ?2",
            rusqlite::params![on.to_string(), id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::DriverNotFound(id));
        }
        debug!(%id, %on, "reset cycle");
        load_driver_row(&conn, id)
    }
}

/// Reads one driver through an open connection, so callers inside a
/// transaction see their own writes.
pub(super) fn load_driver_row(conn: &Connection, id: Uuid) -> Result<Driver> {
    conn.query_row(
        &format!("{SELECT_DRIVER} WHERE id = ?1"),
        [id.to_string()],
        DriverRow::read,
    )
    .optional()?
    .ok_or(StorageError::DriverNotFound(id))?
    .into_driver()
}

/// Raw column values, parsed into a [`Driver`] outside the row callback so
/// parse failures surface as [`StorageError::Corrupt`].
struct DriverRow {
    id: String,
    name: String,
    cycle_hours_used: f64,
    cycle_started_on: String,
    created_at: String,
}

impl DriverRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            cycle_hours_used: row.get(2)?,
            cycle_started_on: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_driver(self) -> Result<Driver> {
        let cycle_started_on = self
            .cycle_started_on
            .parse::<Date>()
            .map_err(|e| StorageError::Corrupt(format!("invalid cycle_started_on: {e}")))?;
        Ok(Driver {
            id: parse_id(&self.id, "driver id")?,
            name: self.name,
            cycle_hours_used: self.cycle_hours_used,
            cycle_started_on,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        })
    }
}
