//! Three-phase current quantities and measurement snapshots.
//!
//! Two representations exist and they never mix:
//! - [`PhasePhasors`] holds complex per-unit currents straight out of the
//!   symmetrical-components model.
//! - [`PhaseCurrents`] holds ampere magnitudes, the form used by reference
//!   tables, sensor frames and the table-based locator.
//!
//! [`PhasePhasors::to_amperes`] is the single conversion point between them.

use crate::units::Amperes;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Phase selector for column lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    A,
    B,
    C,
}

/// Complex per-unit phase currents (Ia, Ib, Ic).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhasePhasors {
    pub ia: Complex64,
    pub ib: Complex64,
    pub ic: Complex64,
}

impl PhasePhasors {
    pub fn new(ia: Complex64, ib: Complex64, ic: Complex64) -> Self {
        Self { ia, ib, ic }
    }

    /// Magnitudes in amperes given the base current.
    pub fn to_amperes(&self, base_current: Amperes) -> PhaseCurrents {
        let base = base_current.value();
        PhaseCurrents {
            ia: self.ia.norm() * base,
            ib: self.ib.norm() * base,
            ic: self.ic.norm() * base,
        }
    }
}

/// Phase current magnitudes in amperes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseCurrents {
    pub ia: f64,
    pub ib: f64,
    pub ic: f64,
}

impl PhaseCurrents {
    pub fn new(ia: f64, ib: f64, ic: f64) -> Self {
        Self { ia, ib, ic }
    }

    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::A => self.ia,
            Phase::B => self.ib,
            Phase::C => self.ic,
        }
    }

    /// Largest of the three magnitudes.
    pub fn peak(&self) -> f64 {
        self.ia.max(self.ib).max(self.ic)
    }

    /// Scale each phase independently.
    pub fn scaled(&self, factors: [f64; 3]) -> Self {
        Self {
            ia: self.ia * factors[0],
            ib: self.ib * factors[1],
            ic: self.ic * factors[2],
        }
    }
}

/// One measurement snapshot: a row of phase currents per monitoring unit.
///
/// Row order matches the unit order of the feeder configuration, so the row
/// index is the unit index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorFrame {
    rows: Vec<PhaseCurrents>,
}

impl SensorFrame {
    pub fn new(rows: Vec<PhaseCurrents>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PhaseCurrents] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<PhaseCurrents> for SensorFrame {
    fn from_iter<I: IntoIterator<Item = PhaseCurrents>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_amperes_uses_magnitudes() {
        let phasors = PhasePhasors::new(
            Complex64::new(3.0, 4.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(0.0, 0.0),
        );
        let amps = phasors.to_amperes(Amperes(100.0));
        assert!((amps.ia - 500.0).abs() < 1e-9);
        assert!((amps.ib - 100.0).abs() < 1e-9);
        assert_eq!(amps.ic, 0.0);
    }

    #[test]
    fn test_peak_and_scaling() {
        let currents = PhaseCurrents::new(10.0, 250.0, 240.0);
        assert_eq!(currents.peak(), 250.0);
        assert_eq!(currents.get(Phase::C), 240.0);

        let scaled = currents.scaled([2.0, 1.0, 0.5]);
        assert_eq!(scaled, PhaseCurrents::new(20.0, 250.0, 120.0));
    }

    #[test]
    fn test_frame_collects_rows() {
        let frame: SensorFrame = (0..3)
            .map(|i| PhaseCurrents::new(i as f64, 0.0, 0.0))
            .collect();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.rows()[2].ia, 2.0);
    }
}
