use anyhow::{Context, Result};
use overwatch_algo::{FaultReport, LocateResult, TableLocator};
use overwatch_cli::common::{feeder_config, print_json, OutputFormat};
use overwatch_io::{load_reference_tables, load_sensor_frame};
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;

pub fn handle(
    table: &Path,
    frame: &Path,
    config: Option<&Path>,
    threshold: f64,
    format: OutputFormat,
) -> Result<()> {
    let feeder = feeder_config(config)?;
    let tables = load_reference_tables(table)?;
    let frame = load_sensor_frame(frame)?;

    let locator = TableLocator::new(&tables, &feeder)?.with_trip_threshold(threshold);
    let result = locator
        .locate(&frame)
        .context("locating fault from sensor frame")?;

    let report = FaultReport::from_result(&result, &feeder);

    match format {
        OutputFormat::Json => print_json(&json!({
            "label": result.label(),
            "result": result,
            "report": report,
        })),
        OutputFormat::Table => print_result(&result, report.as_ref()),
    }
}

fn print_result(result: &LocateResult, report: Option<&FaultReport>) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "Status\t{:?}", result.status)?;
    writeln!(writer, "Fault type\t{}", result.label())?;
    if result.is_fault() {
        writeln!(writer, "Distance\t{:.3} km", result.distance_km)?;
        match report {
            Some(report) => {
                writeln!(writer, "Distance from source\t{:.0} m", report.distance_m)?;
                writeln!(
                    writer,
                    "Identified by unit\t{} ({:.2} km)",
                    report.unit_index, report.unit_distance_km
                )?;
            }
            None => {
                if let Some(unit) = result.unit_index {
                    writeln!(writer, "Identified by unit\t{unit}")?;
                }
            }
        }
        writeln!(writer, "Measured current\t{:.2} A", result.measured_current_a)?;
        writeln!(writer, "Matched table current\t{:.2} A", result.matched_current_a)?;
        if let Some(report) = report {
            writeln!(writer, "Severity\t{}", report.severity.label())?;
        }
    }
    writer.flush()?;
    Ok(())
}
