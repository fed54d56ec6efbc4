//! Fault types and per-evaluation fault descriptions.

use crate::error::{OverwatchError, OverwatchResult};
use crate::units::{Kilometers, Ohms};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three canonical shunt fault types on a three-phase feeder.
///
/// Integer tags follow the persisted table format: 1 = SLG, 2 = LL, 3 = 3PH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaultType {
    /// Phase A to ground
    #[serde(rename = "slg")]
    SingleLineToGround,
    /// Phase B to phase C
    #[serde(rename = "ll")]
    LineToLine,
    /// Balanced three-phase
    #[serde(rename = "3ph")]
    ThreePhase,
}

impl FaultType {
    /// All fault types in tag order.
    pub const ALL: [FaultType; 3] = [
        FaultType::SingleLineToGround,
        FaultType::LineToLine,
        FaultType::ThreePhase,
    ];

    /// Integer tag used in persisted reference tables.
    pub fn tag(self) -> u8 {
        match self {
            FaultType::SingleLineToGround => 1,
            FaultType::LineToLine => 2,
            FaultType::ThreePhase => 3,
        }
    }

    /// Inverse of [`FaultType::tag`]. Any other value is rejected.
    pub fn from_tag(tag: u8) -> OverwatchResult<Self> {
        match tag {
            1 => Ok(FaultType::SingleLineToGround),
            2 => Ok(FaultType::LineToLine),
            3 => Ok(FaultType::ThreePhase),
            other => Err(OverwatchError::InvalidArgument(format!(
                "unknown fault type tag {other}; expected 1 (SLG), 2 (LL) or 3 (3PH)"
            ))),
        }
    }

    /// Short code used on the command line and in reports.
    pub fn code(self) -> &'static str {
        match self {
            FaultType::SingleLineToGround => "slg",
            FaultType::LineToLine => "ll",
            FaultType::ThreePhase => "3ph",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultType::SingleLineToGround => "single-line-to-ground",
            FaultType::LineToLine => "line-to-line",
            FaultType::ThreePhase => "three-phase",
        };
        f.write_str(name)
    }
}

impl FromStr for FaultType {
    type Err = OverwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slg" | "1" | "single-line-to-ground" => Ok(FaultType::SingleLineToGround),
            "ll" | "2" | "line-to-line" => Ok(FaultType::LineToLine),
            "3ph" | "3" | "three-phase" => Ok(FaultType::ThreePhase),
            other => Err(OverwatchError::InvalidArgument(format!(
                "unknown fault type '{other}'; expected slg, ll or 3ph"
            ))),
        }
    }
}

/// A single fault to evaluate: where, what kind, and through how much resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultSpec {
    pub distance: Kilometers,
    pub fault_type: FaultType,
    pub resistance: Ohms,
}

impl FaultSpec {
    /// Bolted fault (zero fault resistance).
    pub fn bolted(distance_km: f64, fault_type: FaultType) -> Self {
        Self {
            distance: Kilometers(distance_km),
            fault_type,
            resistance: Ohms(0.0),
        }
    }

    pub fn with_resistance(mut self, ohms: f64) -> Self {
        self.resistance = Ohms(ohms);
        self
    }
}
