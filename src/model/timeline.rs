//! Fixed-resolution daily grid for the logging form.

use serde::{Deserialize, Serialize};

use super::event::DutyStatus;

/// Slots in one day's grid.
pub const SLOTS_PER_DAY: usize = 96;

/// Minutes covered by one slot.
pub const MINUTES_PER_SLOT: u32 = 15;

/// One day's status, one label per 15-minute slot from 00:00 to 24:00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTimeline {
    pub day_index: u32,
    pub timeline: Vec<DutyStatus>,
}

impl DayTimeline {
    /// Hours painted with `status`, at slot resolution.
    pub fn hours_in(&self, status: DutyStatus) -> f64 {
        let slots = self.timeline.iter().filter(|s| **s == status).count();
        slots as f64 * f64::from(MINUTES_PER_SLOT) / 60.0
    }
}
