use anyhow::Result;
use overwatch_algo::{simulate_sensor_frame, NoiseModel};
use overwatch_cli::cli::FaultArgs;
use overwatch_cli::common::{feeder_config, print_json, OutputFormat};
use overwatch_core::SensorFrame;
use overwatch_io::write_sensor_frame;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(
    fault: &FaultArgs,
    noise: f64,
    seed: u64,
    config: Option<&Path>,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let feeder = feeder_config(config)?;
    let spec = fault.to_spec();

    let clean = simulate_sensor_frame(&feeder, &spec)?;
    let frame = if noise > 0.0 {
        let mut rng = StdRng::seed_from_u64(seed);
        NoiseModel::relative(noise).apply_frame(&clean, &mut rng)
    } else {
        clean
    };

    if let Some(out) = out {
        write_sensor_frame(&frame, out)?;
        info!(path = %out.display(), "wrote sensor frame");
    }

    match format {
        OutputFormat::Json => print_json(&json!({
            "fault": spec,
            "unit_distances_km": feeder.unit_distances_km,
            "frame": frame,
        })),
        OutputFormat::Table => print_frame(&frame, &feeder.unit_distances_km),
    }
}

fn print_frame(frame: &SensorFrame, unit_distances_km: &[f64]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "UNIT\tKM\tIA (A)\tIB (A)\tIC (A)")?;
    for (index, (row, km)) in frame.rows().iter().zip(unit_distances_km).enumerate() {
        writeln!(
            writer,
            "{index}\t{km:.2}\t{:.2}\t{:.2}\t{:.2}",
            row.ia, row.ib, row.ic
        )?;
    }
    writer.flush()?;
    Ok(())
}
