#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use trailmark::console::{FixedLocator, TerminalMap, TerminalUi, run_session};
use trailmark::{Controller, ControllerConfig, Coords, cli, dlog, utils};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = ControllerConfig {
        zoom: cli.zoom,
        ..ControllerConfig::default()
    };
    let mut locator = if cli.no_location {
        FixedLocator::denied()
    } else {
        FixedLocator::at(Coords::new(cli.lat, cli.lon))
    };
    dlog!(
        "mode={} zoom={} json={}",
        cli.script.as_ref().map_or("interactive", |_| "script"),
        config.zoom,
        cli.json
    );

    // In JSON mode stdout only carries list entries and listings.
    let map_out: Box<dyn Write> = if cli.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let mut controller = Controller::new(
        TerminalMap::new(map_out),
        TerminalUi::new(io::stdout(), io::stderr(), cli.json),
        config,
    );
    controller.start(&mut locator);

    let mut out = io::stdout();
    let mut err = io::stderr();
    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening script: {}", path.display()))?;
            run_session(&mut controller, BufReader::new(file), &mut out, &mut err)?;
        }
        None => {
            run_session(&mut controller, io::stdin().lock(), &mut out, &mut err)?;
        }
    }

    tracing::info!(workouts = controller.workouts().len(), "session over");
    Ok(())
}
