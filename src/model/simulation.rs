//! What one simulation run produces.

use serde::{Deserialize, Serialize};

use super::event::{DayLog, FuelStop};

/// How a simulated trip ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// All driving was planned and the load was dropped off.
    Completed,

    /// The driver ran out of cycle hours before the trip finished.
    /// The last day ends with a `Cycle Limit Reached` marker and no dropoff.
    CycleExhausted,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CycleExhausted => "cycle exhausted",
        }
    }
}

/// The planned duty timeline for a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub distance_miles: f64,
    pub fuel_stops: Vec<FuelStop>,
    pub daily_logs: Vec<DayLog>,
    pub outcome: Outcome,
    /// Non-off-duty hours across the whole trip: what the trip costs the
    /// driver's cycle.
    pub on_duty_hours: f64,
}
