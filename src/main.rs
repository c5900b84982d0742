//! # idmd command-line entry point
//!
//! ```text
//! main()
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Install logging (stderr + rolling file)
//!   ├─> Load settings (--config or the platform config dir)
//!   └─> Run the subcommand
//! ```
//!
//! ```bash
//! idmd generate --distribution uniform --rows 200 --cols 4 -o data.csv
//! idmd process -i data.csv --replace "Uniform Distribution 1:outliers:median" -o clean.csv
//! idmd report -i clean.csv -o data_report.pdf
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Commands print their results

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    idmd::logging::init(cli.verbose)?;

    let settings = cli::settings_for(&cli);
    tracing::debug!("Running with settings: {settings:?}");

    cli::run_command(cli.command, &settings).inspect_err(|e| {
        tracing::error!("{e:#}");
    })
}
