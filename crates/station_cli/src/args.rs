//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Look up monitoring stations by country.
#[derive(Debug, Clone, Parser)]
#[command(name = "station-cli", version, about)]
pub struct Args {
    /// Station store path. Falls back to `STATION_DB_PATH` when omitted.
    #[arg(long = "db", value_name = "PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print stations located in COUNTRY as a JSON response envelope.
    Find {
        /// Country name, matched exactly after trimming.
        country: String,
    },
    /// Print the crate version.
    Version,
}
