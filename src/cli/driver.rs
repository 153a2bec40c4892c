//! Driver commands: new, list, reset.

use clap::Subcommand;
use jiff::{Timestamp, Zoned};
use uuid::Uuid;

use crate::{model::Driver, storage::Storage};

use super::{resolve_driver, short_id};

#[derive(Debug, Subcommand)]
pub enum DriverCommand {
    /// Register a driver. Prints the driver ID.
    New {
        /// Driver's name.
        name: String,

        /// Cycle hours already used when the driver is registered.
        #[arg(long, default_value_t = 0.0)]
        cycle_used: f64,
    },

    /// List drivers with their cycle hours.
    List,

    /// Start a new cycle: zero the driver's hours as of today.
    Reset {
        /// Driver ID: full UUID or unambiguous prefix.
        driver: String,
    },
}

pub(super) fn run(storage: &Storage, command: DriverCommand) -> Result<(), String> {
    match command {
        DriverCommand::New { name, cycle_used } => cmd_new(storage, &name, cycle_used),
        DriverCommand::List => cmd_list(storage),
        DriverCommand::Reset { driver } => {
            let driver = resolve_driver(storage, &driver)?;
            cmd_reset(storage, &driver)
        }
    }
}

fn cmd_new(storage: &Storage, name: &str, cycle_used: f64) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("driver name cannot be empty".to_string());
    }
    if !cycle_used.is_finite() || cycle_used < 0.0 {
        return Err(format!(
            "--cycle-used must be a non-negative number, got {cycle_used}"
        ));
    }

    let driver = Driver {
        id: Uuid::new_v4(),
        name: name.to_string(),
        cycle_hours_used: cycle_used,
        cycle_started_on: Zoned::now().date(),
        created_at: Timestamp::now(),
    };

    storage
        .create_driver(&driver)
        .map_err(|e| format!("failed to create driver: {e}"))?;

    println!("{}", driver.id);
    Ok(())
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let drivers = storage
        .list_drivers()
        .map_err(|e| format!("failed to list drivers: {e}"))?;

    if drivers.is_empty() {
        println!("No drivers");
        return Ok(());
    }

    for d in &drivers {
        println!(
            "{}  {:>6.2}h since {}  {}",
            short_id(d.id),
            d.cycle_hours_used,
            d.cycle_started_on,
            d.name
        );
    }

    Ok(())
}

fn cmd_reset(storage: &Storage, driver: &Driver) -> Result<(), String> {
    let reset = storage
        .reset_cycle(driver.id, Zoned::now().date())
        .map_err(|e| format!("failed to reset cycle: {e}"))?;

    eprintln!(
        "Driver {} ({}) cycle reset: {:.2}h → 0h, new cycle from {}",
        short_id(reset.id),
        reset.name,
        driver.cycle_hours_used,
        reset.cycle_started_on
    );
    Ok(())
}
