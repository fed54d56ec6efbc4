use anyhow::{Context, Result};
use overwatch_algo::build_reference_tables;
use overwatch_cli::cli::TableCommands;
use overwatch_io::save_reference_tables;
use std::time::Instant;
use tracing::info;

use overwatch_cli::common::feeder_config;

pub fn handle(command: &TableCommands) -> Result<()> {
    match command {
        TableCommands::Build {
            config,
            out,
            step,
            max_length,
        } => {
            let feeder = feeder_config(config.as_deref())?;
            let max_length = max_length.unwrap_or(feeder.length.value());
            info!(step_km = step, max_length_km = max_length, "building reference tables");

            let start = Instant::now();
            let tables = build_reference_tables(&feeder, max_length, *step)
                .context("building reference tables")?;
            save_reference_tables(&tables, out)?;

            println!(
                "Wrote {} rows ({} per fault type) to {} in {:.1?}",
                tables.total_rows(),
                tables.total_rows() / 3,
                out.display(),
                start.elapsed()
            );
            Ok(())
        }
    }
}
