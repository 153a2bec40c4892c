//! Trip commands: plan, list, show.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::model::Trip;
use crate::plan::{CycleSource, TripRequest, parse_cycle_hours, plan_trip};
use crate::route::{FixedDistance, OpenRouteService, RouteEstimator};
use crate::storage::Storage;

use super::{format, resolve_driver, resolve_trip, short_id};

#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Plan a trip and record it. Prints the trip report.
    ///
    /// With `--driver` (or `default-driver` in config) the trip is planned
    /// against that driver's cycle hours and charged to them. With
    /// `--cycle-used` it is planned against the given hours and stored
    /// without a driver.
    Plan(PlanArgs),

    /// List recorded trips.
    List {
        /// Only trips for this driver (UUID or prefix).
        #[arg(long)]
        driver: Option<String>,
    },

    /// Show a recorded trip.
    Show {
        /// Trip ID: full UUID or unambiguous prefix.
        trip: String,

        /// Print JSON instead of the report.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Where the driver is now.
    #[arg(long)]
    pub from: String,

    /// Where the load is picked up.
    #[arg(long)]
    pub pickup: String,

    /// Where the load is dropped off.
    #[arg(long)]
    pub dropoff: String,

    /// Driver ID: full UUID or unambiguous prefix.
    #[arg(long, conflicts_with = "cycle_used")]
    pub driver: Option<String>,

    /// Cycle hours already used, for a trip without a driver.
    /// Unreadable values count as 0.
    #[arg(long)]
    pub cycle_used: Option<String>,

    /// Use this route distance instead of asking the routing provider.
    #[arg(long)]
    pub distance_miles: Option<f64>,

    /// OpenRouteService API key. Falls back to `ORS_API_KEY`, then config.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print JSON instead of the report.
    #[arg(long)]
    pub json: bool,
}

pub(super) fn run(config: &Config, storage: &Storage, command: TripCommand) -> Result<(), String> {
    match command {
        TripCommand::Plan(args) => cmd_plan(config, storage, &args),
        TripCommand::List { driver } => cmd_list(storage, driver.as_deref()),
        TripCommand::Show { trip, json } => {
            let trip = resolve_trip(storage, &trip)?;
            print_trip(&trip, json)
        }
    }
}

fn cmd_plan(config: &Config, storage: &Storage, args: &PlanArgs) -> Result<(), String> {
    let cycle = match (&args.driver, &args.cycle_used) {
        (Some(reference), _) => CycleSource::Driver(resolve_driver(storage, reference)?.id),
        (None, Some(raw)) => CycleSource::Hours(parse_cycle_hours(raw)),
        (None, None) => match &config.default_driver {
            Some(reference) => CycleSource::Driver(resolve_driver(storage, reference)?.id),
            None => {
                return Err(
                    "specify --driver or --cycle-used (or set default-driver in config)"
                        .to_string(),
                );
            }
        },
    };

    let estimator: Box<dyn RouteEstimator> = match args.distance_miles {
        Some(distance_miles) => Box::new(FixedDistance { distance_miles }),
        None => {
            let key = config.resolve_api_key(args.api_key.as_deref()).ok_or(
                "no OpenRouteService API key: pass --api-key, set ORS_API_KEY, \
                 or add api-key to the config file",
            )?;
            Box::new(OpenRouteService::new(key))
        }
    };

    let request = TripRequest {
        current_location: args.from.clone(),
        pickup_location: args.pickup.clone(),
        dropoff_location: args.dropoff.clone(),
    };

    let trip = plan_trip(estimator.as_ref(), storage, &config.rules, &request, cycle)
        .map_err(|e| format!("failed to plan trip: {e}"))?;

    print_trip(&trip, args.json)
}

fn cmd_list(storage: &Storage, driver: Option<&str>) -> Result<(), String> {
    let driver_id = driver
        .map(|reference| resolve_driver(storage, reference).map(|d| d.id))
        .transpose()?;
    let trips = storage
        .list_trips(driver_id)
        .map_err(|e| format!("failed to list trips: {e}"))?;

    if trips.is_empty() {
        println!("No trips");
        return Ok(());
    }

    for t in &trips {
        println!(
            "{}  {}  [{}]  {:>7.1} mi  {:>6.2}h  {} → {} → {}",
            short_id(t.id),
            t.created_at.strftime("%Y-%m-%d"),
            t.outcome.label(),
            t.distance_miles,
            t.cycle_hours_used,
            t.current_location,
            t.pickup_location,
            t.dropoff_location
        );
    }

    Ok(())
}

fn print_trip(trip: &Trip, json: bool) -> Result<(), String> {
    if json {
        let json = serde_json::to_string_pretty(trip)
            .map_err(|e| format!("failed to serialize trip: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format::format_trip(trip));
    }
    Ok(())
}
