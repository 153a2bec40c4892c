//! Trip storage, and the cycle ledger update that goes with recording one.

use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::model::{Driver, Outcome, Trip};

use super::driver::load_driver_row;
use super::{Result, Storage, StorageError, parse_id, parse_timestamp};

const SELECT_TRIP: &str = "SELECT id, driver_id, current_location, pickup_location,
    dropoff_location, cycle_hours_before, cycle_hours_used, distance_miles, outcome,
    route, logs, fuel_stops, eld_form, created_at FROM trip";

impl Storage {
    /// Plans and records a trip against a driver's ledger in one transaction.
    ///
    /// `plan` sees the driver as of the start of the transaction. The trip it
    /// returns is inserted and its `cycle_hours_used` added to the driver's
    /// ledger before the commit. The write lock is taken up front, so two
    /// concurrent recordings for the same driver are serialized and neither
    /// plans against a stale ledger.
    pub fn record_trip<T, E>(&self, driver_id: Uuid, plan: T) -> core::result::Result<Trip, E>
    where
        T: FnOnce(&Driver) -> core::result::Result<Trip, E>,
        E: From<StorageError>,
    {
        let mut conn = self.open()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StorageError::from)?;

        let driver = load_driver_row(&tx, driver_id)?;
        let trip = plan(&driver)?;

        insert_trip(&tx, &trip)?;
        tx.execute(
            "UPDATE driver SET cycle_hours_used = cycle_hours_used + ?1 WHERE id = ?2",
            rusqlite::params![trip.cycle_hours_used, driver_id.to_string()],
        )
        .map_err(StorageError::from)?;
        tx.commit().map_err(StorageError::from)?;

        debug!(
            trip = %trip.id,
            driver = %driver_id,
            before = driver.cycle_hours_used,
            added = trip.cycle_hours_used,
            "recorded trip"
        );
        Ok(trip)
    }

    /// Saves a trip that isn't tied to a driver's ledger.
    pub fn save_trip(&self, trip: &Trip) -> Result<()> {
        insert_trip(&self.open()?, trip)?;
        debug!(trip = %trip.id, "saved trip");
        Ok(())
    }

    /// Loads a single trip.
    pub fn load_trip(&self, id: Uuid) -> Result<Trip> {
        let conn = self.open()?;
        conn.query_row(
            &format!("{SELECT_TRIP} WHERE id = ?1"),
            [id.to_string()],
            TripRow::read,
        )
        .optional()?
        .ok_or(StorageError::TripNotFound(id))?
        .into_trip()
    }

    /// Lists trips, oldest first, optionally only those of one driver.
    pub fn list_trips(&self, driver_id: Option<Uuid>) -> Result<Vec<Trip>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_TRIP} WHERE ?1 IS NULL OR driver_id = ?1"
        ))?;
        let rows = stmt
            .query_map([driver_id.map(|id| id.to_string())], TripRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut trips = rows
            .into_iter()
            .map(TripRow::into_trip)
            .collect::<Result<Vec<_>>>()?;
        trips.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(trips)
    }
}

fn insert_trip(conn: &Connection, trip: &Trip) -> Result<()> {
    conn.execute(
        "INSERT INTO trip (id, driver_id, current_location, pickup_location,
            dropoff_location, cycle_hours_before, cycle_hours_used, distance_miles, outcome,
            route, logs, fuel_stops, eld_form, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            trip.id.to_string(),
            trip.driver_id.map(|id| id.to_string()),
            &trip.current_location,
            &trip.pickup_location,
            &trip.dropoff_location,
            trip.cycle_hours_before,
            trip.cycle_hours_used,
            trip.distance_miles,
            serde_json::to_string(&trip.outcome)?,
            serde_json::to_string(&trip.route)?,
            serde_json::to_string(&trip.logs)?,
            serde_json::to_string(&trip.fuel_stops)?,
            serde_json::to_string(&trip.eld_form)?,
            trip.created_at.to_string(),
        ],
    )?;
    Ok(())
}

/// Raw column values; JSON columns are decoded in [`TripRow::into_trip`].
struct TripRow {
    id: String,
    driver_id: Option<String>,
    current_location: String,
    pickup_location: String,
    dropoff_location: String,
    cycle_hours_before: f64,
    cycle_hours_used: f64,
    distance_miles: f64,
    outcome: String,
    route: String,
    logs: String,
    fuel_stops: String,
    eld_form: String,
    created_at: String,
}

impl TripRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            driver_id: row.get(1)?,
            current_location: row.get(2)?,
            pickup_location: row.get(3)?,
            dropoff_location: row.get(4)?,
            cycle_hours_before: row.get(5)?,
            cycle_hours_used: row.get(6)?,
            distance_miles: row.get(7)?,
            outcome: row.get(8)?,
            route: row.get(9)?,
            logs: row.get(10)?,
            fuel_stops: row.get(11)?,
            eld_form: row.get(12)?,
            created_at: row.get(13)?,
        })
    }

    fn into_trip(self) -> Result<Trip> {
        let outcome: Outcome = json_column(&self.outcome, "outcome")?;
        Ok(Trip {
            id: parse_id(&self.id, "trip id")?,
            driver_id: self
                .driver_id
                .as_deref()
                .map(|raw| parse_id(raw, "driver_id"))
                .transpose()?,
            current_location: self.current_location,
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            cycle_hours_before: self.cycle_hours_before,
            cycle_hours_used: self.cycle_hours_used,
            distance_miles: self.distance_miles,
            route: json_column(&self.route, "route")?,
            logs: json_column(&self.logs, "logs")?,
            fuel_stops: json_column(&self.fuel_stops, "fuel_stops")?,
            eld_form: json_column(&self.eld_form, "eld_form")?,
            outcome,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        })
    }
}

fn json_column<T: DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| StorageError::Corrupt(format!("invalid {column}: {e}")))
}
