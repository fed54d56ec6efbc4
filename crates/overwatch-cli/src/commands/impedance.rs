use anyhow::Result;
use overwatch_algo::{compute_relay_measurement, locate_by_impedance};
use overwatch_cli::cli::{FaultArgs, PolicyArgs};
use overwatch_cli::common::{feeder_config, print_json, OutputFormat};
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;

pub fn handle(
    fault: &FaultArgs,
    policy: &PolicyArgs,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let feeder = feeder_config(config)?;
    let spec = fault.to_spec();
    let policy = policy.to_policy();

    let relay = compute_relay_measurement(&feeder, &spec, &policy)?;
    let estimate_km = locate_by_impedance(
        relay.voltage,
        relay.current,
        spec.fault_type,
        &feeder,
        &policy,
    );
    let error_km = (estimate_km - fault.distance).abs();

    match format {
        OutputFormat::Json => print_json(&json!({
            "fault": spec,
            "policy": policy,
            "relay": relay,
            "estimate_km": estimate_km,
            "error_km": error_km,
        })),
        OutputFormat::Table => {
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "Fault\t{} at {:.3} km", spec.fault_type, fault.distance)?;
            writeln!(
                writer,
                "Loop voltage\t{:.5} ∠ {:.2}° pu",
                relay.voltage.norm(),
                relay.voltage.arg().to_degrees()
            )?;
            writeln!(
                writer,
                "Loop current\t{:.5} ∠ {:.2}° pu",
                relay.current.norm(),
                relay.current.arg().to_degrees()
            )?;
            writeln!(writer, "Estimated distance\t{estimate_km:.3} km")?;
            writeln!(writer, "Error\t{error_km:.3} km")?;
            writer.flush()?;
            Ok(())
        }
    }
}
