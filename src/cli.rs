use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::controller::DEFAULT_ZOOM;

// Greenwich, for when no position is given.
const DEFAULT_LAT: f64 = 51.4779;
const DEFAULT_LON: f64 = -0.0015;

#[derive(Parser, Debug)]
#[command(
    name = "trailmark",
    about = "Log running and cycling workouts by clicking points on a map"
)]
pub struct Cli {
    /// Latitude the location lookup reports.
    #[arg(long, default_value_t = DEFAULT_LAT, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude the location lookup reports.
    #[arg(long, default_value_t = DEFAULT_LON, allow_hyphen_values = true)]
    pub lon: f64,

    /// Behave as if the location permission was denied.
    #[arg(long)]
    pub no_location: bool,

    /// Map zoom level used for the initial view and when jumping to a workout.
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Read commands from this file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Print workout list entries as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}
