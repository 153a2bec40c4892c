//! Timeline quantizer: paints each day's events onto a 96-slot grid.
//!
//! Every event paints at least one slot, so the zero-length cycle-limit
//! marker stays visible. Clock times are wall-clock, so an event that runs
//! past midnight (the end-of-day rest) ends "before" it starts and paints
//! only its first slot; anything that would land beyond 23:45 is clamped
//! into the last slot.

use crate::model::{ClockTime, DayLog, DayTimeline, DutyStatus, MINUTES_PER_SLOT, SLOTS_PER_DAY};

/// Builds one grid row per day log. Later events overwrite earlier ones.
pub fn quantize(daily_logs: &[DayLog]) -> Vec<DayTimeline> {
    daily_logs.iter().map(quantize_day).collect()
}

fn quantize_day(day: &DayLog) -> DayTimeline {
    let mut timeline = vec![DutyStatus::OffDuty; SLOTS_PER_DAY];

    for event in &day.events {
        let start = slot(event.start);
        let mut end = slot(event.end);
        if end <= start {
            end = start + 1;
        }
        timeline[start..end.min(SLOTS_PER_DAY)].fill(event.status);
    }

    DayTimeline {
        day_index: day.day_index,
        timeline,
    }
}

fn slot(time: ClockTime) -> usize {
    let index = (time.minutes_since_midnight() / MINUTES_PER_SLOT) as usize;
    index.min(SLOTS_PER_DAY - 1)
}
