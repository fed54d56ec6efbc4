//! Table-based fault locator.
//!
//! Locating runs in three stages over a single [`SensorFrame`]:
//!
//! 1. **Zone identification.** Units are scanned in ascending distance order and
//!    the last one whose peak phase current exceeds the trip threshold becomes
//!    the active unit. On a radial feeder the fault lies at or beyond it, so its
//!    distance is the lower bound of the search.
//! 2. **Classification.** Ratios of the active unit's phase currents to their
//!    peak pick the fault type, the reference table, the target current and the
//!    column to match against. Patterns that fit no type fall back to the SLG
//!    table and are labelled [`Classification::Uncertain`].
//! 3. **Inverse lookup.** The nearest tabulated current within the zone gives
//!    the distance estimate.
//!
//! No trip is a normal outcome ([`FaultStatus::NoFault`]), not an error. The
//! only failures are missing tables (checked when the locator is built), a frame
//! that does not match the configured units, and an exhausted search zone.

use crate::reference::{ReferenceTables, ZONE_TOLERANCE_KM};
use overwatch_core::{
    FaultType, FeederConfig, OverwatchError, OverwatchResult, Phase, PhaseCurrents, SensorFrame,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Peak phase current above which a unit counts as tripped (A).
pub const DEFAULT_TRIP_THRESHOLD_A: f64 = 50.0;

const SLG_FAULTED_RATIO: f64 = 0.5;
const HEALTHY_RATIO: f64 = 0.2;
const LL_FAULTED_RATIO: f64 = 0.8;
const BALANCED_RATIO: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultStatus {
    NoFault,
    FaultConfirmed,
}

/// Fault type inferred from the current pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    SingleLineToGround,
    LineToLine,
    ThreePhase,
    /// No canonical pattern matched; searched as SLG.
    Uncertain,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::SingleLineToGround => "Single Line-to-Ground (Phase A)",
            Classification::LineToLine => "Line-to-Line (Phase B-C)",
            Classification::ThreePhase => "Three-Phase Balanced",
            Classification::Uncertain => "Uncertain (Assumed SLG)",
        }
    }

    /// Reference table searched for this classification.
    pub fn table_type(self) -> FaultType {
        match self {
            Classification::SingleLineToGround | Classification::Uncertain => {
                FaultType::SingleLineToGround
            }
            Classification::LineToLine => FaultType::LineToLine,
            Classification::ThreePhase => FaultType::ThreePhase,
        }
    }

    /// The confidently detected fault type, if any.
    pub fn fault_type(self) -> Option<FaultType> {
        match self {
            Classification::Uncertain => None,
            other => Some(other.table_type()),
        }
    }

    pub fn is_confident(self) -> bool {
        self != Classification::Uncertain
    }
}

/// Outcome of classifying one reading: what to search and for which value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedReading {
    pub classification: Classification,
    pub match_phase: Phase,
    pub target_a: f64,
}

/// Classify a three-phase reading by its current ratios. First match wins.
pub fn classify(reading: &PhaseCurrents) -> ClassifiedReading {
    let PhaseCurrents { ia, ib, ic } = *reading;
    let peak = reading.peak();

    if ia > SLG_FAULTED_RATIO * peak && ib < HEALTHY_RATIO * peak && ic < HEALTHY_RATIO * peak {
        ClassifiedReading {
            classification: Classification::SingleLineToGround,
            match_phase: Phase::A,
            target_a: ia,
        }
    } else if ia < HEALTHY_RATIO * peak && ib > LL_FAULTED_RATIO * peak && ic > LL_FAULTED_RATIO * peak
    {
        ClassifiedReading {
            classification: Classification::LineToLine,
            match_phase: Phase::B,
            target_a: ib,
        }
    } else if ia > BALANCED_RATIO * peak && ib > BALANCED_RATIO * peak && ic > BALANCED_RATIO * peak {
        ClassifiedReading {
            classification: Classification::ThreePhase,
            match_phase: Phase::A,
            target_a: ia,
        }
    } else {
        ClassifiedReading {
            classification: Classification::Uncertain,
            match_phase: Phase::A,
            target_a: peak,
        }
    }
}

/// The furthest unit that saw the fault.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveUnit {
    pub index: usize,
    pub distance_km: f64,
    pub reading: PhaseCurrents,
}

/// Scan units in distance order; the last one above `trip_threshold_a` wins.
pub fn identify_zone(
    frame: &SensorFrame,
    config: &FeederConfig,
    trip_threshold_a: f64,
) -> Option<ActiveUnit> {
    let mut active = None;
    for (index, (reading, &distance_km)) in frame
        .rows()
        .iter()
        .zip(config.unit_distances_km.iter())
        .enumerate()
    {
        if reading.peak() > trip_threshold_a {
            active = Some(ActiveUnit {
                index,
                distance_km,
                reading: *reading,
            });
        }
    }
    active
}

/// Active unit and its classified reading, before any table lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub active: ActiveUnit,
    pub classified: ClassifiedReading,
}

/// Structured result handed to reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocateResult {
    pub status: FaultStatus,
    pub classification: Option<Classification>,
    pub distance_km: f64,
    pub unit_index: Option<usize>,
    /// Current used as the lookup target (A)
    pub measured_current_a: f64,
    /// Tabulated current of the matched row (A)
    pub matched_current_a: f64,
}

impl LocateResult {
    pub fn no_fault() -> Self {
        Self {
            status: FaultStatus::NoFault,
            classification: None,
            distance_km: 0.0,
            unit_index: None,
            measured_current_a: 0.0,
            matched_current_a: 0.0,
        }
    }

    pub fn is_fault(&self) -> bool {
        self.status == FaultStatus::FaultConfirmed
    }

    pub fn label(&self) -> &'static str {
        self.classification.map_or("No Fault", Classification::label)
    }
}

/// Locator bound to a feeder and its reference tables.
#[derive(Debug, Clone, Copy)]
pub struct TableLocator<'a> {
    tables: &'a ReferenceTables,
    config: &'a FeederConfig,
    trip_threshold_a: f64,
}

impl<'a> TableLocator<'a> {
    /// Fails if the feeder is malformed or any reference table is missing.
    pub fn new(tables: &'a ReferenceTables, config: &'a FeederConfig) -> OverwatchResult<Self> {
        config.validate()?;
        tables.ensure_complete()?;
        Ok(Self {
            tables,
            config,
            trip_threshold_a: DEFAULT_TRIP_THRESHOLD_A,
        })
    }

    pub fn with_trip_threshold(mut self, amps: f64) -> Self {
        self.trip_threshold_a = amps;
        self
    }

    pub fn trip_threshold_a(&self) -> f64 {
        self.trip_threshold_a
    }

    /// Zone identification and classification without the table lookup.
    ///
    /// `Ok(None)` means no unit tripped.
    pub fn assess(&self, frame: &SensorFrame) -> OverwatchResult<Option<Assessment>> {
        if frame.len() != self.config.unit_count() {
            return Err(OverwatchError::InvalidArgument(format!(
                "sensor frame has {} rows but the feeder has {} monitoring units",
                frame.len(),
                self.config.unit_count()
            )));
        }

        let Some(active) = identify_zone(frame, self.config, self.trip_threshold_a) else {
            debug!(threshold_a = self.trip_threshold_a, "no unit tripped");
            return Ok(None);
        };

        let classified = classify(&active.reading);
        if !classified.classification.is_confident() {
            warn!(
                unit = active.index,
                ia = active.reading.ia,
                ib = active.reading.ib,
                ic = active.reading.ic,
                "current pattern matches no fault type; searching the SLG table"
            );
        }
        Ok(Some(Assessment { active, classified }))
    }

    /// Search the zone of an assessed frame for the matching distance.
    pub fn resolve(&self, assessment: &Assessment) -> OverwatchResult<LocateResult> {
        let Assessment { active, classified } = *assessment;
        let table_type = classified.classification.table_type();
        let exhausted = || OverwatchError::ZoneExhausted {
            unit_index: active.index,
            min_search_km: active.distance_km,
            fault_type: table_type,
        };
        // Nothing can lie beyond a unit sitting at the feeder end.
        if active.distance_km >= self.config.length.value() - ZONE_TOLERANCE_KM {
            return Err(exhausted());
        }

        let table = self.tables.get(table_type);
        let row = table
            .nearest(active.distance_km, classified.match_phase, classified.target_a)
            .ok_or_else(exhausted)?;

        debug!(
            unit = active.index,
            classification = classified.classification.label(),
            target_a = classified.target_a,
            distance_km = row.distance_km,
            "fault located"
        );

        Ok(LocateResult {
            status: FaultStatus::FaultConfirmed,
            classification: Some(classified.classification),
            distance_km: row.distance_km,
            unit_index: Some(active.index),
            measured_current_a: classified.target_a,
            matched_current_a: row.currents.get(classified.match_phase),
        })
    }

    pub fn locate(&self, frame: &SensorFrame) -> OverwatchResult<LocateResult> {
        match self.assess(frame)? {
            Some(assessment) => self.resolve(&assessment),
            None => Ok(LocateResult::no_fault()),
        }
    }
}

/// One-shot locate without keeping a [`TableLocator`] around.
pub fn locate(
    frame: &SensorFrame,
    tables: &ReferenceTables,
    config: &FeederConfig,
) -> OverwatchResult<LocateResult> {
    TableLocator::new(tables, config)?.locate(frame)
}
