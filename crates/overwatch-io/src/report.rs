//! Per-trial CSV report of a Monte Carlo comparison.

use anyhow::{Context, Result};
use overwatch_algo::{Classification, TrialOutcome};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Serialize)]
struct ReportRecord<'a> {
    trial: usize,
    fault_type: &'a str,
    true_distance_km: f64,
    classification: &'a str,
    unit_index: Option<usize>,
    table_estimate_km: Option<f64>,
    table_error_km: Option<f64>,
    impedance_estimate_km: f64,
    impedance_error_km: f64,
    distance_m: Option<f64>,
    severity: Option<&'static str>,
}

/// Write one row per outcome. Empty cells mark trials the table locator could
/// not place (no trip or exhausted zone).
pub fn write_trial_report(outcomes: &[TrialOutcome], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating trial report: {}", path.display()))?;

    for outcome in outcomes {
        writer
            .serialize(ReportRecord {
                trial: outcome.trial,
                fault_type: outcome.fault_type.code(),
                true_distance_km: outcome.true_distance_km,
                classification: outcome
                    .classification
                    .map_or("none", Classification::label),
                unit_index: outcome.unit_index,
                table_estimate_km: outcome.table_estimate_km,
                table_error_km: outcome.table_error_km(),
                impedance_estimate_km: outcome.impedance_estimate_km,
                impedance_error_km: outcome.impedance_error_km(),
                distance_m: outcome.report.map(|r| r.distance_m),
                severity: outcome.report.map(|r| r.severity.label()),
            })
            .with_context(|| format!("writing trial {} to {}", outcome.trial, path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing trial report: {}", path.display()))?;

    info!(path = %path.display(), trials = outcomes.len(), "wrote trial report");
    Ok(())
}
