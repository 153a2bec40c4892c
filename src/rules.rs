//! Hours-of-service rule set.
//!
//! Every regulatory parameter the engine reads lives here, so a different
//! rule set can be simulated by loading a different `[rules]` table from
//! config instead of changing code.

use serde::{Deserialize, Serialize};

use crate::model::ClockTime;
use crate::simulate::SimulateError;

/// Duty-time limits and fixed event durations. All durations are in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HosRules {
    /// On-duty hours allowed per rolling cycle.
    pub max_cycle_hours: f64,
    /// Driving hours allowed per day.
    pub driving_limit: f64,
    /// On-duty hours (driving included) allowed per day.
    pub on_duty_limit: f64,
    /// Driving hours after which a break is mandatory.
    pub break_after_driving: f64,
    pub break_duration: f64,
    /// Off-duty rest that closes a day.
    pub rest_duration: f64,
    /// Miles between fueling stops.
    pub fuel_mile_interval: f64,
    pub fuel_duration: f64,
    pub pickup_duration: f64,
    pub dropoff_duration: f64,
    /// Longest single driving event.
    pub max_segment: f64,
    /// Miles per hour, used to convert route distance into driving time.
    pub average_speed: f64,
    /// Clock time every simulated day starts at.
    pub day_start: ClockTime,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            max_cycle_hours: 70.0,
            driving_limit: 11.0,
            on_duty_limit: 14.0,
            break_after_driving: 8.0,
            break_duration: 0.5,
            rest_duration: 10.0,
            fuel_mile_interval: 1000.0,
            fuel_duration: 0.25,
            pickup_duration: 1.0,
            dropoff_duration: 1.0,
            max_segment: 1.0,
            average_speed: 50.0,
            day_start: ClockTime::from_hm(6, 0),
        }
    }
}

impl HosRules {
    /// Checks that every limit is finite and the ones the engine divides
    /// time by are positive.
    pub fn validate(&self) -> Result<(), SimulateError> {
        let positive = [
            ("max-cycle-hours", self.max_cycle_hours),
            ("driving-limit", self.driving_limit),
            ("on-duty-limit", self.on_duty_limit),
            ("break-after-driving", self.break_after_driving),
            ("fuel-mile-interval", self.fuel_mile_interval),
            ("max-segment", self.max_segment),
            ("average-speed", self.average_speed),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulateError::InvalidRules(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let durations = [
            ("break-duration", self.break_duration),
            ("rest-duration", self.rest_duration),
            ("fuel-duration", self.fuel_duration),
            ("pickup-duration", self.pickup_duration),
            ("dropoff-duration", self.dropoff_duration),
        ];
        for (name, value) in durations {
            if !value.is_finite() || !(0.0..24.0).contains(&value) {
                return Err(SimulateError::InvalidRules(format!(
                    "{name} must be between 0 and 24 hours, got {value}"
                )));
            }
        }

        Ok(())
    }
}
