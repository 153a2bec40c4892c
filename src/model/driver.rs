//! Drivers and their cycle-hours ledger.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A driver whose on-duty hours accumulate across trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    /// On-duty hours already used in the current cycle.
    pub cycle_hours_used: f64,
    /// When the current cycle started.
    pub cycle_started_on: Date,
    pub created_at: Timestamp,
}
