//! Impedance-based fault location, the baseline the table locator is compared
//! against.
//!
//! A relay at the substation sees a loop voltage `V` and loop current `I`. The
//! apparent impedance `Z = V / I` grows with distance at a rate set by the
//! loop's per-km characteristic:
//!
//! | Fault | Loop current supplied | Characteristic per km |
//! |-------|-----------------------|-----------------------|
//! | SLG   | phase current `Ia`    | `(2·z1 + z0) / 3`     |
//! | SLG   | zero-sequence `I0`    | `2·z1 + z0`           |
//! | LL    | delta `Ib − Ic`       | `z1`                  |
//! | LL    | phase current `Ib`    | `2·z1`                |
//! | 3PH   | phase current `Ia`    | `z1`                  |
//!
//! When the voltage is the bus voltage the source impedance is already outside
//! the loop. When it is the source EMF, the same loop combination of the source
//! impedance has to be subtracted first. [`ImpedancePolicy`] names which of
//! these variants is in force.
//!
//! All phasors here are complex per-unit.

use crate::circuit::{rotation_operator, sequence_currents, SequenceComponents, PREFAULT_VOLTAGE_PU};
use num_complex::Complex64;
use overwatch_core::{FaultSpec, FaultType, FeederConfig, OverwatchResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Loop currents below this magnitude (pu) carry no distance information.
pub const MIN_CURRENT_PU: f64 = 1e-5;

/// Where the measured loop voltage is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoltageReference {
    /// Substation bus, downstream of the source impedance.
    #[default]
    Bus,
    /// Source EMF; the source impedance is subtracted from the apparent impedance.
    SourceEmf,
}

/// Current paired with the phase-A voltage for ground faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundLoop {
    #[default]
    PhaseCurrent,
    ZeroSequenceCurrent,
}

/// Current paired with the B-C voltage for line-to-line faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineLoop {
    #[default]
    DeltaCurrent,
    PhaseCurrent,
}

/// Named formula variant for the impedance method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImpedancePolicy {
    pub voltage_reference: VoltageReference,
    pub ground_loop: GroundLoop,
    pub line_loop: LineLoop,
}

impl ImpedancePolicy {
    /// Bus voltage, no source correction.
    pub fn bus_measured() -> Self {
        Self::default()
    }

    /// Source EMF with the source impedance subtracted.
    pub fn source_compensated() -> Self {
        Self {
            voltage_reference: VoltageReference::SourceEmf,
            ..Self::default()
        }
    }

    pub fn with_ground_loop(mut self, ground_loop: GroundLoop) -> Self {
        self.ground_loop = ground_loop;
        self
    }

    pub fn with_line_loop(mut self, line_loop: LineLoop) -> Self {
        self.line_loop = line_loop;
        self
    }
}

/// Loop impedance combination for a fault type, applied to any pair of
/// positive- and zero-sequence impedances.
pub fn loop_impedance(
    z1: Complex64,
    z0: Complex64,
    fault_type: FaultType,
    policy: &ImpedancePolicy,
) -> Complex64 {
    match fault_type {
        FaultType::SingleLineToGround => {
            let sum = z1 * 2.0 + z0;
            match policy.ground_loop {
                GroundLoop::PhaseCurrent => sum / 3.0,
                GroundLoop::ZeroSequenceCurrent => sum,
            }
        }
        FaultType::LineToLine => match policy.line_loop {
            LineLoop::DeltaCurrent => z1,
            LineLoop::PhaseCurrent => z1 * 2.0,
        },
        FaultType::ThreePhase => z1,
    }
}

/// Per-km characteristic of the feeder line for a fault type.
pub fn line_characteristic(
    config: &FeederConfig,
    fault_type: FaultType,
    policy: &ImpedancePolicy,
) -> Complex64 {
    loop_impedance(config.z1_per_km, config.z0_per_km, fault_type, policy)
}

/// Estimate the fault distance (km) from one loop voltage/current pair.
///
/// Returns 0.0 when the current is too small to divide by.
pub fn locate_by_impedance(
    v_measured: Complex64,
    i_measured: Complex64,
    fault_type: FaultType,
    config: &FeederConfig,
    policy: &ImpedancePolicy,
) -> f64 {
    if i_measured.norm() < MIN_CURRENT_PU {
        warn!(
            current_pu = i_measured.norm(),
            "loop current below {MIN_CURRENT_PU} pu; reporting 0 km"
        );
        return 0.0;
    }

    let mut apparent = v_measured / i_measured;
    if policy.voltage_reference == VoltageReference::SourceEmf {
        let zs = config.source_impedance;
        apparent -= loop_impedance(zs, zs, fault_type, policy);
    }

    let per_km = line_characteristic(config, fault_type, policy);
    apparent.norm() / per_km.norm()
}

/// Voltage/current loop pair seen at the substation for a simulated fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelayMeasurement {
    pub voltage: Complex64,
    pub current: Complex64,
}

impl RelayMeasurement {
    /// Scale magnitudes, leaving angles untouched.
    pub fn scaled(&self, voltage_factor: f64, current_factor: f64) -> Self {
        Self {
            voltage: self.voltage * voltage_factor,
            current: self.current * current_factor,
        }
    }
}

/// Ground-truth relay loop quantities for `fault` under `policy`.
pub fn compute_relay_measurement(
    config: &FeederConfig,
    fault: &FaultSpec,
    policy: &ImpedancePolicy,
) -> OverwatchResult<RelayMeasurement> {
    let currents = sequence_currents(config, fault)?;
    let [ia, ib, ic] = currents.to_phases();

    let [va, vb, vc] = match policy.voltage_reference {
        VoltageReference::Bus => {
            let zs = config.source_impedance;
            SequenceComponents {
                zero: -zs * currents.zero,
                positive: Complex64::new(PREFAULT_VOLTAGE_PU, 0.0) - zs * currents.positive,
                negative: -zs * currents.negative,
            }
            .to_phases()
        }
        VoltageReference::SourceEmf => {
            let a = rotation_operator();
            let e = Complex64::new(PREFAULT_VOLTAGE_PU, 0.0);
            [e, e * a * a, e * a]
        }
    };

    let (voltage, current) = match fault.fault_type {
        FaultType::SingleLineToGround => match policy.ground_loop {
            GroundLoop::PhaseCurrent => (va, ia),
            GroundLoop::ZeroSequenceCurrent => (va, currents.zero),
        },
        FaultType::LineToLine => match policy.line_loop {
            LineLoop::DeltaCurrent => (vb - vc, ib - ic),
            LineLoop::PhaseCurrent => (vb - vc, ib),
        },
        FaultType::ThreePhase => (va, ia),
    };
    Ok(RelayMeasurement { voltage, current })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_policies() -> Vec<ImpedancePolicy> {
        let mut policies = Vec::new();
        for base in [
            ImpedancePolicy::bus_measured(),
            ImpedancePolicy::source_compensated(),
        ] {
            for ground in [GroundLoop::PhaseCurrent, GroundLoop::ZeroSequenceCurrent] {
                for line in [LineLoop::DeltaCurrent, LineLoop::PhaseCurrent] {
                    policies.push(base.with_ground_loop(ground).with_line_loop(line));
                }
            }
        }
        policies
    }

    #[test]
    fn test_three_phase_bolted_is_exact() {
        let config = FeederConfig::default();
        let policy = ImpedancePolicy::bus_measured();
        let fault = FaultSpec::bolted(4.0, FaultType::ThreePhase);
        let m = compute_relay_measurement(&config, &fault, &policy).unwrap();
        let d = locate_by_impedance(m.voltage, m.current, FaultType::ThreePhase, &config, &policy);
        assert!((d - 4.0).abs() < 1e-9, "got {d}");
    }

    #[test]
    fn test_every_variant_recovers_bolted_distance() {
        let config = FeederConfig::default();
        for policy in all_policies() {
            for fault_type in FaultType::ALL {
                for distance in [0.5, 2.0, 7.25] {
                    let fault = FaultSpec::bolted(distance, fault_type);
                    let m = compute_relay_measurement(&config, &fault, &policy).unwrap();
                    let d = locate_by_impedance(m.voltage, m.current, fault_type, &config, &policy);
                    assert!(
                        (d - distance).abs() < 1e-9,
                        "{fault_type} at {distance} km under {policy:?} gave {d}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_uncompensated_emf_overestimates() {
        let config = FeederConfig::default();
        let compensated = ImpedancePolicy::source_compensated();
        let fault = FaultSpec::bolted(2.0, FaultType::ThreePhase);
        let m = compute_relay_measurement(&config, &fault, &compensated).unwrap();

        let naive = ImpedancePolicy {
            voltage_reference: VoltageReference::Bus,
            ..compensated
        };
        let d = locate_by_impedance(m.voltage, m.current, FaultType::ThreePhase, &config, &naive);
        assert!(d > 2.0);
    }

    #[test]
    fn test_zero_current_guard() {
        let config = FeederConfig::default();
        let d = locate_by_impedance(
            Complex64::new(1.0, 0.0),
            Complex64::new(1e-7, 0.0),
            FaultType::SingleLineToGround,
            &config,
            &ImpedancePolicy::default(),
        );
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_fault_resistance_biases_upward() {
        let config = FeederConfig::default();
        let policy = ImpedancePolicy::bus_measured();
        let fault = FaultSpec::bolted(3.0, FaultType::SingleLineToGround).with_resistance(5.0);
        let m = compute_relay_measurement(&config, &fault, &policy).unwrap();
        let d = locate_by_impedance(
            m.voltage,
            m.current,
            FaultType::SingleLineToGround,
            &config,
            &policy,
        );
        assert!(d > 3.0);
    }

    #[test]
    fn test_characteristics() {
        let config = FeederConfig::default();
        let policy = ImpedancePolicy::default();
        let slg = line_characteristic(&config, FaultType::SingleLineToGround, &policy);
        let expected = (config.z1_per_km * 2.0 + config.z0_per_km) / 3.0;
        assert!((slg - expected).norm() < 1e-15);

        let ll_phase = line_characteristic(
            &config,
            FaultType::LineToLine,
            &policy.with_line_loop(LineLoop::PhaseCurrent),
        );
        assert!((ll_phase - config.z1_per_km * 2.0).norm() < 1e-15);
    }
}
