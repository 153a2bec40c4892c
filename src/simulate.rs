//! HOS rule engine: turns required driving time into per-day duty logs.
//!
//! The engine is a small state machine. A [`Cursor`] holds everything the
//! rules look at (clock, daily counters, trip totals) and [`transition`] is a
//! pure function from `(phase, cursor)` to the next phase, the next cursor,
//! and whatever the step emitted. [`simulate`] drives it from
//! [`Phase::Pickup`] to [`Phase::Done`] and groups the output into days.
//!
//! Within one driving iteration the order is fixed: fuel stop, then break,
//! then the daily-limit rollover. Every new day starts at the rule set's
//! `day_start`, whatever time the previous day's rest ended.

use std::mem;

use tracing::debug;

use crate::model::{ClockTime, DayLog, DutyStatus, Event, FuelStop, Outcome, SimulationResult};
use crate::rules::HosRules;

/// Slack for comparing accumulated hours and miles against thresholds.
const EPSILON: f64 = 1e-9;

/// Input the engine refuses to run on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid rules: {0}")]
    InvalidRules(String),
}

/// Where the engine is in the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pickup,
    /// Loop head: plan the next driving segment, or finish.
    Driving,
    Fueling,
    /// Mandatory break, followed by the daily-limit check.
    Breaking,
    DayRollover,
    CycleExhausted,
    Dropoff,
    Done(Outcome),
}

/// Everything the rules need to decide the next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub clock: ClockTime,
    pub day_index: u32,
    pub driving_today: f64,
    pub on_duty_today: f64,
    /// On-duty hours across the whole trip, charged against the cycle.
    pub on_duty_trip: f64,
    pub remaining_driving: f64,
    /// Cycle hours the driver had left when the trip began.
    pub cycle_budget: f64,
    pub miles: f64,
    pub next_fuel_mile: f64,
}

impl Cursor {
    /// The cursor at the start of day 1, before pickup.
    pub fn start(rules: &HosRules, total_driving_hours: f64, cycle_hours_used: f64) -> Self {
        Self {
            clock: rules.day_start,
            day_index: 1,
            driving_today: 0.0,
            on_duty_today: 0.0,
            on_duty_trip: 0.0,
            remaining_driving: total_driving_hours,
            cycle_budget: rules.max_cycle_hours - cycle_hours_used,
            miles: 0.0,
            next_fuel_mile: rules.fuel_mile_interval,
        }
    }

    /// Spends `hours` on duty (not driving), returning the event for it.
    fn work(self, hours: f64, description: impl Into<String>) -> (Self, Event) {
        let end = self.clock.after_hours(hours);
        let event = Event::new(DutyStatus::OnDuty, self.clock, end, description);
        let next = Self {
            clock: end,
            on_duty_today: self.on_duty_today + hours,
            on_duty_trip: self.on_duty_trip + hours,
            ..self
        };
        (next, event)
    }

    /// Whether `hours` more on duty still fits in the cycle.
    fn fits_cycle(self, hours: f64) -> bool {
        self.on_duty_trip + hours <= self.cycle_budget + EPSILON
    }
}

/// Something a transition produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    /// Appended to the open day.
    Event(Event),
    FuelStop(FuelStop),
    /// Closes the open day.
    SealDay,
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub phase: Phase,
    pub cursor: Cursor,
    pub emitted: Vec<Emit>,
}

impl Step {
    fn to(phase: Phase, cursor: Cursor) -> Self {
        Self {
            phase,
            cursor,
            emitted: Vec::new(),
        }
    }

    fn emit(mut self, emit: Emit) -> Self {
        self.emitted.push(emit);
        self
    }
}

/// Advances the state machine by one step.
///
/// Pure: the same phase and cursor always give the same step.
pub fn transition(rules: &HosRules, phase: Phase, cursor: Cursor) -> Step {
    match phase {
        Phase::Pickup => {
            let (next, event) = cursor.work(rules.pickup_duration, "Pickup");
            Step::to(Phase::Driving, next).emit(Emit::Event(event))
        }
        Phase::Driving => drive(rules, cursor),
        Phase::Fueling => fuel(rules, cursor),
        Phase::Breaking => take_break(rules, cursor),
        Phase::DayRollover => roll_over(rules, cursor),
        Phase::CycleExhausted => {
            let marker = Event::new(
                DutyStatus::CycleLimitReached,
                cursor.clock,
                cursor.clock,
                "Driver has reached the maximum cycle hours.",
            );
            Step::to(Phase::Done(Outcome::CycleExhausted), cursor)
                .emit(Emit::Event(marker))
                .emit(Emit::SealDay)
        }
        Phase::Dropoff => {
            let (next, event) = cursor.work(rules.dropoff_duration, "Dropoff");
            Step::to(Phase::Done(Outcome::Completed), next)
                .emit(Emit::Event(event))
                .emit(Emit::SealDay)
        }
        Phase::Done(_) => Step::to(phase, cursor),
    }
}

fn drive(rules: &HosRules, cursor: Cursor) -> Step {
    if cursor.remaining_driving <= 0.0 {
        return Step::to(Phase::Dropoff, cursor);
    }

    let daily_available = (rules.driving_limit - cursor.driving_today)
        .min(rules.on_duty_limit - cursor.on_duty_today);
    let available_cycle = cursor.cycle_budget - cursor.on_duty_trip;
    if daily_available <= 0.0 || available_cycle <= 0.0 {
        return Step::to(Phase::CycleExhausted, cursor);
    }

    let segment = rules
        .max_segment
        .min(cursor.remaining_driving)
        .min(daily_available)
        .min(available_cycle);
    if segment <= 0.0 {
        return Step::to(Phase::DayRollover, cursor);
    }

    let end = cursor.clock.after_hours(segment);
    let event = Event::new(
        DutyStatus::Driving,
        cursor.clock,
        end,
        format!("Driving segment for {segment:.1} hour(s)"),
    );
    let remaining = cursor.remaining_driving - segment;
    let next = Cursor {
        clock: end,
        driving_today: cursor.driving_today + segment,
        on_duty_today: cursor.on_duty_today + segment,
        on_duty_trip: cursor.on_duty_trip + segment,
        remaining_driving: if remaining < EPSILON { 0.0 } else { remaining },
        miles: cursor.miles + segment * rules.average_speed,
        ..cursor
    };
    Step::to(Phase::Fueling, next).emit(Emit::Event(event))
}

fn fuel(rules: &HosRules, cursor: Cursor) -> Step {
    if cursor.miles + EPSILON < cursor.next_fuel_mile {
        return Step::to(Phase::Breaking, cursor);
    }

    if !cursor.fits_cycle(rules.fuel_duration) {
        return Step::to(Phase::CycleExhausted, cursor);
    }

    let mile = cursor.next_fuel_mile;
    let (next, event) = cursor.work(rules.fuel_duration, "Fueling Stop");
    let next = Cursor {
        next_fuel_mile: mile + rules.fuel_mile_interval,
        ..next
    };
    Step::to(Phase::Breaking, next)
        .emit(Emit::Event(event))
        .emit(Emit::FuelStop(FuelStop::at_mile(mile)))
}

/// Past `break_after_driving` for the day, every segment that leaves
/// driving to do is followed by a break.
fn take_break(rules: &HosRules, cursor: Cursor) -> Step {
    let mut step = Step::to(Phase::Driving, cursor);

    if cursor.driving_today + EPSILON >= rules.break_after_driving
        && cursor.remaining_driving > 0.0
    {
        if !cursor.fits_cycle(rules.break_duration) {
            return Step::to(Phase::CycleExhausted, cursor);
        }
        // A break that would overrun the on-duty window is covered by the
        // day's rest instead.
        if cursor.on_duty_today + rules.break_duration > rules.on_duty_limit + EPSILON {
            return Step::to(Phase::DayRollover, cursor);
        }
        let minutes = (rules.break_duration * 60.0).round();
        let (next, event) = cursor.work(rules.break_duration, format!("{minutes}-minute Break"));
        step = Step::to(Phase::Driving, next).emit(Emit::Event(event));
    }

    let today = step.cursor;
    if today.driving_today + EPSILON >= rules.driving_limit
        || today.on_duty_today + EPSILON >= rules.on_duty_limit
    {
        step.phase = Phase::DayRollover;
    }
    step
}

fn roll_over(rules: &HosRules, cursor: Cursor) -> Step {
    let rest = Event::new(
        DutyStatus::OffDuty,
        cursor.clock,
        cursor.clock.after_hours(rules.rest_duration),
        "End of day rest",
    );
    let next = Cursor {
        clock: rules.day_start,
        day_index: cursor.day_index + 1,
        driving_today: 0.0,
        on_duty_today: 0.0,
        ..cursor
    };
    Step::to(Phase::Driving, next)
        .emit(Emit::Event(rest))
        .emit(Emit::SealDay)
}

/// Plans the duty timeline for a trip needing `total_driving_hours` of
/// driving, for a driver who has already used `cycle_hours_used` of the cycle.
///
/// Running out of cycle hours is not an error: the result comes back with
/// [`Outcome::CycleExhausted`] and whatever could be planned.
pub fn simulate(
    rules: &HosRules,
    total_driving_hours: f64,
    cycle_hours_used: f64,
) -> Result<SimulationResult, SimulateError> {
    rules.validate()?;
    check_hours("total driving hours", total_driving_hours)?;
    check_hours("cycle hours used", cycle_hours_used)?;

    let mut phase = Phase::Pickup;
    let mut cursor = Cursor::start(rules, total_driving_hours, cycle_hours_used);
    let mut daily_logs = Vec::new();
    let mut fuel_stops = Vec::new();
    let mut today = Vec::new();

    let outcome = loop {
        if let Phase::Done(outcome) = phase {
            break outcome;
        }

        let step = transition(rules, phase, cursor);
        for emit in step.emitted {
            match emit {
                Emit::Event(event) => today.push(event),
                Emit::FuelStop(stop) => fuel_stops.push(stop),
                Emit::SealDay => {
                    debug!(day = cursor.day_index, events = today.len(), "sealed duty day");
                    daily_logs.push(DayLog {
                        day_index: cursor.day_index,
                        events: mem::take(&mut today),
                    });
                }
            }
        }
        phase = step.phase;
        cursor = step.cursor;
    };

    debug!(
        days = daily_logs.len(),
        fuel_stops = fuel_stops.len(),
        on_duty = cursor.on_duty_trip,
        outcome = outcome.label(),
        "simulation finished"
    );

    Ok(SimulationResult {
        distance_miles: total_driving_hours * rules.average_speed,
        fuel_stops,
        daily_logs,
        outcome,
        on_duty_hours: cursor.on_duty_trip,
    })
}

fn check_hours(name: &str, hours: f64) -> Result<(), SimulateError> {
    if !hours.is_finite() {
        return Err(SimulateError::InvalidInput(format!(
            "{name} must be a number, got {hours}"
        )));
    }
    if hours < 0.0 {
        return Err(SimulateError::InvalidInput(format!(
            "{name} cannot be negative, got {hours}"
        )));
    }
    Ok(())
}
