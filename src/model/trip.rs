//! Trips: a planned route with its duty logs.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{DayLog, FuelStop};
use super::simulation::Outcome;
use super::timeline::DayTimeline;

/// A `[longitude, latitude]` pair, as returned by the routing provider.
pub type Coordinate = [f64; 2];

/// A planned trip, as recorded and shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    /// `None` when planned against ad-hoc cycle hours rather than a driver's ledger.
    pub driver_id: Option<Uuid>,
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    /// Cycle hours the driver had used before this trip.
    pub cycle_hours_before: f64,
    /// Cycle hours this trip consumed.
    pub cycle_hours_used: f64,
    pub distance_miles: f64,
    pub route: Vec<Coordinate>,
    pub logs: Vec<DayLog>,
    pub fuel_stops: Vec<FuelStop>,
    #[serde(rename = "eldFormData")]
    pub eld_form: Vec<DayTimeline>,
    pub outcome: Outcome,
    pub created_at: Timestamp,
}
