//! Precomputed distance → current reference tables.
//!
//! A [`ReferenceTable`] samples the bolted-fault circuit model at a fixed step
//! along the feeder for one fault type. Rows are ascending by distance, and the
//! constructor rejects anything else, so the zoned search can binary-search the
//! lower bound. Tables are never mutated after construction; share them by
//! reference across threads.

use crate::circuit::compute_fault_amperes;
use overwatch_core::{
    FaultSpec, FaultType, FeederConfig, OverwatchError, OverwatchResult, Phase, PhaseCurrents,
};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default sampling step (10 m).
pub const DEFAULT_STEP_KM: f64 = 0.01;

/// Slack applied to the zone lower bound so a row tabulated at the unit's own
/// position survives floating-point sampling error.
pub const ZONE_TOLERANCE_KM: f64 = 1e-9;

/// One sampled point: fault distance and resulting phase current magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub distance_km: f64,
    pub currents: PhaseCurrents,
}

/// Ordered reference curve for a single fault type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTable {
    fault_type: FaultType,
    rows: Vec<TableRow>,
}

impl ReferenceTable {
    /// Wrap pre-sorted rows. Fails if distances are not finite and
    /// non-decreasing, or if any current is negative or not finite.
    pub fn from_rows(fault_type: FaultType, rows: Vec<TableRow>) -> OverwatchResult<Self> {
        if let Some(bad) = rows.iter().find(|r| !r.distance_km.is_finite()) {
            return Err(OverwatchError::InvalidArgument(format!(
                "{fault_type} table contains a non-finite distance ({})",
                bad.distance_km
            )));
        }
        for r in &rows {
            let PhaseCurrents { ia, ib, ic } = r.currents;
            if let Some(bad) = [ia, ib, ic].into_iter().find(|a| !a.is_finite() || *a < 0.0) {
                return Err(OverwatchError::InvalidArgument(format!(
                    "{fault_type} table row at {} km has an invalid current ({bad})",
                    r.distance_km
                )));
            }
        }
        if let Some(pos) = rows
            .windows(2)
            .position(|pair| pair[1].distance_km < pair[0].distance_km)
        {
            return Err(OverwatchError::InvalidArgument(format!(
                "{fault_type} table is not sorted by distance: row {} ({} km) follows {} km",
                pos + 1,
                rows[pos + 1].distance_km,
                rows[pos].distance_km
            )));
        }
        Ok(Self { fault_type, rows })
    }

    pub fn fault_type(&self) -> FaultType {
        self.fault_type
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_distance_km(&self) -> Option<f64> {
        self.rows.last().map(|r| r.distance_km)
    }

    /// Rows at or beyond `min_km`.
    pub fn zone(&self, min_km: f64) -> &[TableRow] {
        let start = self
            .rows
            .partition_point(|r| r.distance_km < min_km - ZONE_TOLERANCE_KM);
        &self.rows[start..]
    }

    /// Row in the zone whose `phase` column is closest to `target_a`.
    ///
    /// Ties go to the lowest distance. Rows whose difference is not a number
    /// never match. Returns `None` when the zone is empty.
    pub fn nearest(&self, min_km: f64, phase: Phase, target_a: f64) -> Option<&TableRow> {
        let mut best: Option<(&TableRow, f64)> = None;
        for row in self.zone(min_km) {
            let diff = (row.currents.get(phase) - target_a).abs();
            if diff.is_nan() {
                continue;
            }
            match best {
                Some((_, best_diff)) if diff >= best_diff => {}
                _ => best = Some((row, diff)),
            }
        }
        best.map(|(row, _)| row)
    }
}

/// The three per-type reference tables used by the table-based locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    single_line_to_ground: ReferenceTable,
    line_to_line: ReferenceTable,
    three_phase: ReferenceTable,
}

impl ReferenceTables {
    /// Group three tables, checking each one holds the fault type of its slot.
    pub fn new(
        single_line_to_ground: ReferenceTable,
        line_to_line: ReferenceTable,
        three_phase: ReferenceTable,
    ) -> OverwatchResult<Self> {
        for (expected, table) in [
            (FaultType::SingleLineToGround, &single_line_to_ground),
            (FaultType::LineToLine, &line_to_line),
            (FaultType::ThreePhase, &three_phase),
        ] {
            if table.fault_type() != expected {
                return Err(OverwatchError::InvalidArgument(format!(
                    "expected a {expected} table, got {}",
                    table.fault_type()
                )));
            }
        }
        Ok(Self {
            single_line_to_ground,
            line_to_line,
            three_phase,
        })
    }

    pub fn get(&self, fault_type: FaultType) -> &ReferenceTable {
        match fault_type {
            FaultType::SingleLineToGround => &self.single_line_to_ground,
            FaultType::LineToLine => &self.line_to_line,
            FaultType::ThreePhase => &self.three_phase,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceTable> {
        FaultType::ALL.into_iter().map(move |t| self.get(t))
    }

    /// Every table must hold at least one row before locating can start.
    pub fn ensure_complete(&self) -> OverwatchResult<()> {
        for table in self.iter() {
            if table.is_empty() {
                return Err(OverwatchError::MissingTable(format!(
                    "{} reference table has no rows; rebuild the tables before locating",
                    table.fault_type()
                )));
            }
        }
        Ok(())
    }

    pub fn total_rows(&self) -> usize {
        self.iter().map(ReferenceTable::len).sum()
    }
}

fn sample_count(config: &FeederConfig, max_length_km: f64, step_km: f64) -> OverwatchResult<usize> {
    if !step_km.is_finite() || step_km <= 0.0 {
        return Err(OverwatchError::InvalidArgument(format!(
            "table step must be positive, got {step_km} km"
        )));
    }
    if !max_length_km.is_finite() || max_length_km < step_km {
        return Err(OverwatchError::InvalidArgument(format!(
            "table length {max_length_km} km must cover at least one {step_km} km step"
        )));
    }
    if max_length_km > config.length.value() + 1e-9 {
        return Err(OverwatchError::InvalidArgument(format!(
            "table length {max_length_km} km exceeds the feeder length ({})",
            config.length
        )));
    }
    let n = (max_length_km / step_km + 1e-9).floor() as usize;
    Ok(n)
}

/// Sample one fault type at `step_km, 2·step_km, …` up to `max_length_km` inclusive.
pub fn build_reference_table(
    config: &FeederConfig,
    fault_type: FaultType,
    max_length_km: f64,
    step_km: f64,
) -> OverwatchResult<ReferenceTable> {
    let n = sample_count(config, max_length_km, step_km)?;
    let mut rows = Vec::with_capacity(n);
    for i in 1..=n {
        let distance_km = (i as f64 * step_km).min(max_length_km);
        let currents = compute_fault_amperes(config, &FaultSpec::bolted(distance_km, fault_type))?;
        rows.push(TableRow {
            distance_km,
            currents,
        });
    }
    debug!(%fault_type, rows = rows.len(), step_km, "built reference table");
    ReferenceTable::from_rows(fault_type, rows)
}

/// Build the SLG, LL and 3PH tables for a feeder.
pub fn build_reference_tables(
    config: &FeederConfig,
    max_length_km: f64,
    step_km: f64,
) -> OverwatchResult<ReferenceTables> {
    config.validate()?;

    #[cfg(feature = "rayon")]
    let built: Vec<OverwatchResult<ReferenceTable>> = FaultType::ALL
        .par_iter()
        .map(|&t| build_reference_table(config, t, max_length_km, step_km))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let built: Vec<OverwatchResult<ReferenceTable>> = FaultType::ALL
        .iter()
        .map(|&t| build_reference_table(config, t, max_length_km, step_km))
        .collect();

    let [slg, ll, three]: [OverwatchResult<ReferenceTable>; 3] = built
        .try_into()
        .map_err(|_| OverwatchError::Other("table builder produced the wrong number of tables".into()))?;
    ReferenceTables::new(slg?, ll?, three?)
}

/// Tables over the whole feeder at [`DEFAULT_STEP_KM`].
pub fn build_default_tables(config: &FeederConfig) -> OverwatchResult<ReferenceTables> {
    build_reference_tables(config, config.length.value(), DEFAULT_STEP_KM)
}
