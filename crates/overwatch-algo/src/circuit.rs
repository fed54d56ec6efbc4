//! Symmetrical-components fault model for a radial feeder.
//!
//! For a fault at distance `d` the Thevenin sequence impedances seen from the
//! fault point are
//!
//! ```text
//! Z1 = Zs + z1·d      Z2 = Z1      Z0 = Zs + z0·d
//! ```
//!
//! and with a 1.0 pu pre-fault voltage the sequence currents are
//!
//! ```text
//! SLG:  I1 = I2 = I0 = V / (Z1 + Z2 + Z0 + 3·Rf)
//! LL:   I1 = V / (Z1 + Z2 + Rf),  I2 = -I1,  I0 = 0
//! 3PH:  I1 = V / (Z1 + Rf),       I2 = I0 = 0
//! ```
//!
//! Phase currents follow from the synthesis transform with `a = 1∠120°`:
//!
//! ```text
//! Ia = I0 + I1 + I2
//! Ib = I0 + a²·I1 + a·I2
//! Ic = I0 + a·I1 + a²·I2
//! ```
//!
//! Everything here is complex per-unit. Callers that need amperes go through
//! [`PhasePhasors::to_amperes`].

use num_complex::Complex64;
use overwatch_core::{
    FaultSpec, FaultType, FeederConfig, OverwatchError, OverwatchResult, PhaseCurrents,
    PhasePhasors,
};
use std::f64::consts::PI;

/// Pre-fault voltage at the fault point (pu).
pub const PREFAULT_VOLTAGE_PU: f64 = 1.0;

/// The 120° rotation operator `a`.
#[inline]
pub fn rotation_operator() -> Complex64 {
    Complex64::from_polar(1.0, 2.0 * PI / 3.0)
}

/// Zero-, positive- and negative-sequence components of a three-phase quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SequenceComponents {
    pub zero: Complex64,
    pub positive: Complex64,
    pub negative: Complex64,
}

impl SequenceComponents {
    /// Synthesize phase quantities `[A, B, C]`.
    pub fn to_phases(&self) -> [Complex64; 3] {
        let a = rotation_operator();
        let a2 = a * a;
        [
            self.zero + self.positive + self.negative,
            self.zero + a2 * self.positive + a * self.negative,
            self.zero + a * self.positive + a2 * self.negative,
        ]
    }

    pub fn to_phasors(&self) -> PhasePhasors {
        let [ia, ib, ic] = self.to_phases();
        PhasePhasors::new(ia, ib, ic)
    }
}

/// Total sequence impedances from the source to the fault point (pu).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceImpedances {
    pub positive: Complex64,
    pub negative: Complex64,
    pub zero: Complex64,
}

pub fn sequence_impedances(config: &FeederConfig, distance_km: f64) -> SequenceImpedances {
    let positive = config.source_impedance + config.z1_per_km * distance_km;
    SequenceImpedances {
        positive,
        negative: positive,
        zero: config.source_impedance + config.z0_per_km * distance_km,
    }
}

fn check_fault(config: &FeederConfig, fault: &FaultSpec) -> OverwatchResult<()> {
    let d = fault.distance.value();
    if !d.is_finite() || d < 0.0 {
        return Err(OverwatchError::InvalidArgument(format!(
            "fault distance must be a finite, non-negative length, got {d} km"
        )));
    }
    if d > config.length.value() + 1e-9 {
        return Err(OverwatchError::InvalidArgument(format!(
            "fault at {} lies beyond the feeder end ({})",
            fault.distance, config.length
        )));
    }
    let rf = fault.resistance.value();
    if !rf.is_finite() || rf < 0.0 {
        return Err(OverwatchError::InvalidArgument(format!(
            "fault resistance must be finite and non-negative, got {rf} Ω"
        )));
    }
    Ok(())
}

/// Sequence currents flowing into the fault (pu).
pub fn sequence_currents(
    config: &FeederConfig,
    fault: &FaultSpec,
) -> OverwatchResult<SequenceComponents> {
    check_fault(config, fault)?;

    let z = sequence_impedances(config, fault.distance.value());
    let rf = Complex64::new(fault.resistance.to_per_unit(config.base_impedance()), 0.0);
    let v = Complex64::new(PREFAULT_VOLTAGE_PU, 0.0);
    let zero = Complex64::new(0.0, 0.0);

    let components = match fault.fault_type {
        FaultType::SingleLineToGround => {
            let i1 = v / (z.positive + z.negative + z.zero + rf * 3.0);
            SequenceComponents {
                zero: i1,
                positive: i1,
                negative: i1,
            }
        }
        FaultType::LineToLine => {
            let i1 = v / (z.positive + z.negative + rf);
            SequenceComponents {
                zero,
                positive: i1,
                negative: -i1,
            }
        }
        FaultType::ThreePhase => SequenceComponents {
            zero,
            positive: v / (z.positive + rf),
            negative: zero,
        },
    };
    Ok(components)
}

/// Theoretical phase current phasors (pu) for a single fault.
pub fn compute_fault_currents(
    config: &FeederConfig,
    fault: &FaultSpec,
) -> OverwatchResult<PhasePhasors> {
    Ok(sequence_currents(config, fault)?.to_phasors())
}

/// Theoretical phase current magnitudes in amperes.
pub fn compute_fault_amperes(
    config: &FeederConfig,
    fault: &FaultSpec,
) -> OverwatchResult<PhaseCurrents> {
    Ok(compute_fault_currents(config, fault)?.to_amperes(config.base_current()))
}
