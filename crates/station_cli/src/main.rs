//! Station lookup command-line entry point.
//!
//! # Responsibility
//! - Load store configuration once at startup and keep it immutable.
//! - Initialize optional file logging.
//! - Render one lookup as a JSON response envelope on stdout.

mod args;
mod response;

use args::{Args, Command};
use clap::Parser;
use log::info;
use station_core::config::ENV_DB_PATH;
use station_core::{
    core_version, default_log_level, init_logging, SqliteStationRepository, StationQueryService,
    StoreConfig,
};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(message) => {
            eprintln!("station-cli: {message}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<u8, String> {
    if let Some(log_dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, &log_dir.to_string_lossy()).map_err(|err| err.to_string())?;
    }

    match args.command {
        Command::Version => {
            println!("station_core version={}", core_version());
            Ok(0)
        }
        Command::Find { country } => {
            let config = load_config(args.db_path.as_deref()).map_err(|err| err.to_string())?;
            info!(
                "event=cli_start module=cli status=ok busy_timeout_ms={} retry_attempts={}",
                config.busy_timeout().as_millis(),
                config.retry().max_attempts()
            );

            let service = StationQueryService::new(SqliteStationRepository::new(config));
            let response = response::lookup(&service, &country);
            let rendered = serde_json::to_string_pretty(&response).map_err(|err| err.to_string())?;
            println!("{rendered}");
            Ok(response.exit_code())
        }
    }
}

/// Builds the store config from the environment, with `--db` taking
/// precedence over `STATION_DB_PATH`.
fn load_config(db_path: Option<&Path>) -> Result<StoreConfig, station_core::ConfigError> {
    StoreConfig::from_lookup(|key| match db_path {
        Some(path) if key == ENV_DB_PATH => Some(path.to_string_lossy().into_owned()),
        _ => std::env::var(key).ok(),
    })
}
