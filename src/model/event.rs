//! Duty events: the rows of a daily log.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::clock::ClockTime;

/// Duty status of an event or a timeline slot.
///
/// Serialized with the labels printed on the paper log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DutyStatus {
    #[serde(rename = "On Duty")]
    OnDuty,
    #[serde(rename = "Driving")]
    Driving,
    #[serde(rename = "Off Duty")]
    OffDuty,
    /// Zero-duration marker: the driver ran out of cycle hours.
    #[serde(rename = "Cycle Limit Reached")]
    CycleLimitReached,
}

impl DutyStatus {
    pub const ALL: [Self; 4] = [
        Self::OffDuty,
        Self::OnDuty,
        Self::Driving,
        Self::CycleLimitReached,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OnDuty => "On Duty",
            Self::Driving => "Driving",
            Self::OffDuty => "Off Duty",
            Self::CycleLimitReached => "Cycle Limit Reached",
        }
    }

    /// Whether time in this status counts against duty limits.
    pub fn is_on_duty(self) -> bool {
        matches!(self, Self::OnDuty | Self::Driving)
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One stretch of time on the duty timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub status: DutyStatus,
    pub start: ClockTime,
    pub end: ClockTime,
    /// Free text for the log reader. Nothing downstream interprets it.
    pub description: String,
}

impl Event {
    pub fn new(
        status: DutyStatus,
        start: ClockTime,
        end: ClockTime,
        description: impl Into<String>,
    ) -> Self {
        Self {
            status,
            start,
            end,
            description: description.into(),
        }
    }

    /// Length of the event in hours.
    pub fn hours(&self) -> f64 {
        self.end.hours_since(self.start)
    }
}

/// All events for one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLog {
    /// 1-based.
    pub day_index: u32,
    pub events: Vec<Event>,
}

impl DayLog {
    /// Total hours spent in `status` over the day.
    pub fn hours_in(&self, status: DutyStatus) -> f64 {
        self.events
            .iter()
            .filter(|e| e.status == status)
            .map(Event::hours)
            .sum()
    }

    /// Hours that count against the daily on-duty limit.
    pub fn on_duty_hours(&self) -> f64 {
        self.events
            .iter()
            .filter(|e| e.status.is_on_duty())
            .map(Event::hours)
            .sum()
    }
}

/// A fueling stop, recorded each time the trip crosses a fuel interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStop {
    pub mile: f64,
    pub location: String,
}

impl FuelStop {
    pub fn at_mile(mile: f64) -> Self {
        Self {
            mile,
            location: format!("Fuel Stop at mile {mile:.0}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_log_labels() {
        let json = serde_json::to_string(&DutyStatus::ALL).unwrap();
        assert_eq!(
            json,
            r#"["Off Duty","On Duty","Driving","Cycle Limit Reached"]"#
        );
    }

    #[test]
    fn day_log_serializes_camel_case() {
        let day = DayLog {
            day_index: 1,
            events: vec![Event::new(
                DutyStatus::OnDuty,
                ClockTime::from_hm(6, 0),
                ClockTime::from_hm(7, 0),
                "Pickup",
            )],
        };
        let value = serde_json::to_value(&day).unwrap();
        assert_eq!(value["dayIndex"], 1);
        assert_eq!(value["events"][0]["status"], "On Duty");
        assert_eq!(value["events"][0]["start"], "06:00");
        assert_eq!(value["events"][0]["end"], "07:00");
        assert_eq!(value["events"][0]["description"], "Pickup");
    }

    #[test]
    fn day_log_sums_hours_by_status() {
        let six = ClockTime::from_hm(6, 0);
        let seven = ClockTime::from_hm(7, 0);
        let nine = ClockTime::from_hm(9, 0);
        let day = DayLog {
            day_index: 1,
            events: vec![
                Event::new(DutyStatus::OnDuty, six, seven, "Pickup"),
                Event::new(DutyStatus::Driving, seven, nine, "Driving"),
                Event::new(DutyStatus::CycleLimitReached, nine, nine, "Limit"),
            ],
        };
        assert!((day.hours_in(DutyStatus::Driving) - 2.0).abs() < 1e-9);
        assert!((day.on_duty_hours() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn fuel_stop_label() {
        assert_eq!(FuelStop::at_mile(2000.0).location, "Fuel Stop at mile 2000");
    }
}
