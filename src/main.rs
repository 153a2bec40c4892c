mod cli;
mod config;
mod model;
mod plan;
mod quantize;
mod route;
mod rules;
mod simulate;
mod storage;

use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

use config::Config;
use storage::Storage;

/// Environment variable holding the log filter, e.g. `HAUL_LOG=haul=debug`.
const LOG_ENV: &str = "HAUL_LOG";

fn main() {
    setup_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let root = Storage::default_root().unwrap_or_else(|| {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    });

    let storage = match Storage::new(root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr so reports and JSON on stdout stay clean.
fn setup_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}
