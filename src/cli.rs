//! CLI interface for Haul.
//!
//! Each subcommand is non-interactive: arguments in, a report (or JSON with
//! `--json`) out.
//!
//! - `haul driver new|list|reset`: drivers and their cycle ledgers.
//! - `haul trip plan|list|show`: route, simulate, and record trips.
//! - `haul simulate`: the rule engine alone, no routing or storage.
//!
//! Driver and trip references take a full UUID or unambiguous prefix.

mod driver;
mod format;
mod trip;

use clap::{Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::model::{DayTimeline, Driver, SimulationResult, Trip};
use crate::plan::parse_cycle_hours;
use crate::quantize::quantize;
use crate::simulate::simulate;
use crate::storage::Storage;

use driver::DriverCommand;
use trip::TripCommand;

/// Haul: plan trucking trips within hours-of-service limits.
#[derive(Debug, Parser)]
#[command(name = "haul", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: planning a trip for a driver
  1. haul driver new "Dana Reyes"
     → prints a driver ID (e.g. a3b0fc12)
  2. haul trip plan --driver a3b --from "Chicago, IL" --pickup "Gary, IN" --dropoff "Denver, CO"
     → routes, plans the duty logs, and charges the hours to Dana's cycle
  3. haul trip list --driver a3b
  4. haul driver reset a3b   (after a 34-hour restart)

Offline:
  haul trip plan --cycle-used 20 --distance-miles 1000 --from A --pickup B --dropoff C
  haul simulate --hours 30 --cycle-used 12.5"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage drivers and their cycle hours.
    Driver {
        #[command(subcommand)]
        command: DriverCommand,
    },

    /// Plan and review trips.
    Trip {
        #[command(subcommand)]
        command: TripCommand,
    },

    /// Run the rule engine on a number of driving hours.
    ///
    /// Nothing is routed or stored.
    Simulate {
        /// Driving hours the trip needs.
        #[arg(long)]
        hours: f64,

        /// Cycle hours already used. Unreadable values count as 0.
        #[arg(long, default_value = "0")]
        cycle_used: String,

        /// Print JSON instead of the report.
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Driver { command } => driver::run(storage, command),
        Command::Trip { command } => trip::run(config, storage, command),
        Command::Simulate {
            hours,
            cycle_used,
            json,
        } => cmd_simulate(config, hours, &cycle_used, json),
    }
}

/// What `simulate --json` prints: the engine output plus its grid.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationOutput<'a> {
    #[serde(flatten)]
    result: &'a SimulationResult,
    eld_form_data: &'a [DayTimeline],
}

fn cmd_simulate(config: &Config, hours: f64, cycle_used: &str, json: bool) -> Result<(), String> {
    let used = parse_cycle_hours(cycle_used);
    let result = simulate(&config.rules, hours, used).map_err(|e| e.to_string())?;
    let eld_form = quantize(&result.daily_logs);

    if json {
        let output = SimulationOutput {
            result: &result,
            eld_form_data: &eld_form,
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| format!("failed to serialize simulation: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "{} of driving, {:.0} miles, {} of cycle used before",
        format::hours(hours),
        result.distance_miles,
        format::hours(used)
    );
    println!(
        "Outcome: {} ({} on duty)",
        result.outcome.label(),
        format::hours(result.on_duty_hours)
    );
    print!(
        "{}",
        format::format_days(&result.daily_logs, &eld_form, &result.fuel_stops)
    );
    Ok(())
}

// ── Reference resolution ──

/// First 8 characters of an ID, for display.
fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Resolve a driver reference (full UUID or unambiguous prefix) to a driver.
fn resolve_driver(storage: &Storage, reference: &str) -> Result<Driver, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_driver(id)
            .map_err(|e| format!("driver not found: {e}"));
    }

    let drivers = storage
        .list_drivers()
        .map_err(|e| format!("failed to list drivers: {e}"))?;
    match_prefix("driver", reference, drivers, |d| d.id)
}

/// Resolve a trip reference (full UUID or unambiguous prefix) to a trip.
fn resolve_trip(storage: &Storage, reference: &str) -> Result<Trip, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_trip(id)
            .map_err(|e| format!("trip not found: {e}"));
    }

    let trips = storage
        .list_trips(None)
        .map_err(|e| format!("failed to list trips: {e}"))?;
    match_prefix("trip", reference, trips, |t| t.id)
}

/// Picks the single item whose ID starts with `reference`.
fn match_prefix<T>(
    kind: &str,
    reference: &str,
    items: Vec<T>,
    id: impl Fn(&T) -> Uuid,
) -> Result<T, String> {
    let reference = reference.to_ascii_lowercase();
    let mut matches: Vec<T> = items
        .into_iter()
        .filter(|item| id(item).to_string().starts_with(&reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no {kind} matching '{reference}'")),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<String> = matches.iter().map(|item| short_id(id(item))).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} {kind}s: {}",
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    fn id(raw: &str) -> Uuid {
        raw.parse().unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prefix_matches_single_item() {
        let items = vec![
            id("a3b0fc12-0000-4000-8000-000000000000"),
            id("b7c1d2e3-0000-4000-8000-000000000000"),
        ];
        let found = match_prefix("driver", "A3B", items, |u| *u).unwrap();
        assert_eq!(found, id("a3b0fc12-0000-4000-8000-000000000000"));
    }

    #[test]
    fn prefix_without_match_fails() {
        let items = vec![id("a3b0fc12-0000-4000-8000-000000000000")];
        let err = match_prefix("trip", "ff", items, |u| *u).unwrap_err();
        assert_eq!(err, "no trip matching 'ff'");
    }

    #[test]
    fn ambiguous_prefix_lists_candidates() {
        let items = vec![
            id("a3b0fc12-0000-4000-8000-000000000000"),
            id("a3b9aa00-0000-4000-8000-000000000000"),
        ];
        let err = match_prefix("driver", "a3b", items, |u| *u).unwrap_err();
        assert_eq!(
            err,
            "'a3b' is ambiguous: matches 2 drivers: a3b0fc12, a3b9aa00"
        );
    }

    #[test]
    fn parses_trip_plan_arguments() {
        let cli = Cli::try_parse_from([
            "haul",
            "trip",
            "plan",
            "--from",
            "Chicago, IL",
            "--pickup",
            "Gary, IN",
            "--dropoff",
            "Denver, CO",
            "--distance-miles",
            "1000",
            "--cycle-used",
            "12",
        ])
        .unwrap();

        let Command::Trip {
            command: TripCommand::Plan(args),
        } = cli.command
        else {
            panic!("expected trip plan");
        };
        assert_eq!(args.from, "Chicago, IL");
        assert_eq!(args.distance_miles, Some(1000.0));
        assert_eq!(args.cycle_used.as_deref(), Some("12"));
        assert!(args.driver.is_none());
        assert!(!args.json);
    }

    #[test]
    fn simulate_defaults_cycle_used_to_zero() {
        let cli = Cli::try_parse_from(["haul", "simulate", "--hours", "11"]).unwrap();
        let Command::Simulate {
            hours, cycle_used, ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(hours, 11.0);
        assert_eq!(cycle_used, "0");
    }

    #[test]
    fn simulation_json_has_grid_alongside_result() {
        let result = simulate(&crate::rules::HosRules::default(), 2.0, 0.0).unwrap();
        let eld_form = quantize(&result.daily_logs);
        let value = serde_json::to_value(SimulationOutput {
            result: &result,
            eld_form_data: &eld_form,
        })
        .unwrap();

        assert_eq!(value["outcome"], "completed");
        assert_eq!(value["daily_logs"][0]["dayIndex"], 1);
        assert_eq!(value["eldFormData"][0]["timeline"].as_array().unwrap().len(), 96);
    }
}
