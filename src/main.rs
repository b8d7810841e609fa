//! # carbonsight command-line entry point
//!
//! ```bash
//! carbonsight sample --output data/raw/emissions_data.csv
//! carbonsight validate --file data/raw/emissions_data.csv
//! carbonsight top --file data/raw/emissions_data.csv -n 3
//! carbonsight simulate --file data/raw/emissions_data.csv --activity "Road Travel" --percent 20
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use clap::Parser as _;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    carbonsight::logging::init(&cli.log_level, !cli.no_log_file)?;

    if let Err(err) = cli::run_command(cli) {
        tracing::error!("{err:#}");
        return Err(err);
    }
    Ok(())
}
