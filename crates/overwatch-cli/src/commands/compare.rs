use anyhow::{Context, Result};
use overwatch_algo::{
    build_reference_tables, run_trials, summarize, NoiseModel, TrialScenario, TrialSummary,
};
use overwatch_cli::cli::CompareArgs;
use overwatch_cli::common::{feeder_config, print_json, OutputFormat};
use overwatch_io::{load_reference_tables, write_trial_report};
use serde_json::json;
use std::io::{self, Write};
use std::time::Instant;
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(args: &CompareArgs) -> Result<()> {
    let feeder = feeder_config(args.config.as_deref())?;
    let tables = match &args.table {
        Some(path) => load_reference_tables(path)?,
        None => build_reference_tables(&feeder, feeder.length.value(), args.step)
            .context("building reference tables")?,
    };

    let scenario = TrialScenario::new(args.fault.to_spec())
        .with_noise(NoiseModel::relative(args.noise))
        .with_policy(args.policy.to_policy());

    let start = Instant::now();
    let outcomes = run_trials(&feeder, &tables, &scenario, args.trials, args.seed)?;
    let summary = summarize(&outcomes);
    info!(elapsed = ?start.elapsed(), "trials complete");

    if let Some(out) = &args.out {
        write_trial_report(&outcomes, out)?;
    }

    match args.format {
        OutputFormat::Json => print_json(&json!({
            "scenario": scenario,
            "seed": args.seed,
            "summary": summary,
        })),
        OutputFormat::Table => print_summary(&scenario, &summary),
    }
}

fn print_summary(scenario: &TrialScenario, summary: &TrialSummary) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "Scenario\t{} at {:.3} km, ±{:.1}% noise",
        scenario.fault.fault_type,
        scenario.fault.distance.value(),
        scenario.noise.relative * 100.0
    )?;
    writeln!(writer, "Trials\t{}", summary.trials)?;
    writeln!(writer, "Detected\t{}", summary.detected)?;
    writeln!(writer, "Located by table\t{}", summary.located)?;
    writeln!(
        writer,
        "Reported\t{} critical, {} warning",
        summary.critical, summary.warning
    )?;
    writeln!(
        writer,
        "Correct classification\t{:.1}%",
        summary.classification_accuracy * 100.0
    )?;
    writeln!(writer)?;
    writeln!(writer, "METHOD\tMEAN ERROR (km)\tMAX ERROR (km)")?;
    writeln!(
        writer,
        "table\t{:.4}\t{:.4}",
        summary.table_mean_error_km, summary.table_max_error_km
    )?;
    writeln!(
        writer,
        "impedance\t{:.4}\t{:.4}",
        summary.impedance_mean_error_km, summary.impedance_max_error_km
    )?;
    writer.flush()?;
    Ok(())
}
