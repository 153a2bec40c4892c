//! Core data model for Haul.
//!
//! Duty events and day logs produced by the rule engine, the quantized
//! timelines built from them, and the drivers and trips that get stored.

mod clock;
mod driver;
mod event;
mod simulation;
mod timeline;
mod trip;

pub use clock::ClockTime;
pub use driver::Driver;
pub use event::{DayLog, DutyStatus, Event, FuelStop};
pub use simulation::{Outcome, SimulationResult};
pub use timeline::{DayTimeline, MINUTES_PER_SLOT, SLOTS_PER_DAY};
pub use trip::{Coordinate, Trip};
