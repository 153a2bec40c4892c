//! Output formatting for CLI display.

use crate::model::{DayLog, DayTimeline, DutyStatus, FuelStop, Trip};

use super::short_id;

/// Width of the row labels in the duty grid.
const LABEL_WIDTH: usize = 12;

/// Hours with at most two decimals and no trailing zeros: `11h`, `0.25h`.
pub(super) fn hours(h: f64) -> String {
    let text = format!("{h:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}h")
}

/// Joins lines, each ending in a newline.
fn block(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Full trip report: header, then every day.
pub(super) fn format_trip(trip: &Trip) -> String {
    let mut lines = vec![
        format!("Trip {}  [{}]", short_id(trip.id), trip.outcome.label()),
        format!(
            "  {} → {} → {}",
            trip.current_location, trip.pickup_location, trip.dropoff_location
        ),
    ];
    if let Some(driver_id) = trip.driver_id {
        lines.push(format!("  Driver {}", short_id(driver_id)));
    }
    lines.push(format!(
        "  {:.1} miles, {} on duty, {} of cycle used before",
        trip.distance_miles,
        hours(trip.cycle_hours_used),
        hours(trip.cycle_hours_before)
    ));

    let mut out = block(&lines);
    out.push_str(&format_days(&trip.logs, &trip.eld_form, &trip.fuel_stops));
    out
}

/// Each day's events and duty grid, then the fuel stops.
pub(super) fn format_days(logs: &[DayLog], grid: &[DayTimeline], fuel_stops: &[FuelStop]) -> String {
    let mut out = String::new();
    for (log, row) in logs.iter().zip(grid) {
        out.push_str(&format!(
            "\nDay {}  ({} on duty)\n",
            log.day_index,
            hours(log.on_duty_hours())
        ));
        out.push_str(&format_events(log));
        out.push('\n');
        out.push_str(&format_grid(row));
    }

    out.push('\n');
    if fuel_stops.is_empty() {
        out.push_str("No fuel stops\n");
    } else {
        out.push_str("Fuel stops:\n");
        let stops: Vec<String> = fuel_stops
            .iter()
            .map(|stop| format!("  {}", stop.location))
            .collect();
        out.push_str(&block(&stops));
    }
    out
}

/// One line per event: `06:00-07:00  On Duty  Pickup`.
fn format_events(log: &DayLog) -> String {
    let lines: Vec<String> = log
        .events
        .iter()
        .map(|event| {
            format!(
                "  {}-{}  {:<19}  {}",
                event.start,
                event.end,
                event.status.label(),
                event.description
            )
        })
        .collect();
    block(&lines)
}

/// Four-row duty grid, one character per 15-minute slot, with the hours
/// each row adds up to.
fn format_grid(row: &DayTimeline) -> String {
    let header: String = (0..24).map(|hour| format!("{hour:<4}")).collect();
    let mut lines = vec![format!("  {:LABEL_WIDTH$} {}", "", header.trim_end())];

    for status in DutyStatus::ALL {
        let cells: String = row
            .timeline
            .iter()
            .map(|s| if *s == status { '#' } else { '.' })
            .collect();
        lines.push(format!(
            "  {:<LABEL_WIDTH$}|{cells}| {}",
            grid_label(status),
            hours(row.hours_in(status))
        ));
    }
    block(&lines)
}

fn grid_label(status: DutyStatus) -> &'static str {
    match status {
        DutyStatus::CycleLimitReached => "Cycle Limit",
        other => other.label(),
    }
}
