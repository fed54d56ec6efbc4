//! Sensor-frame simulation and Monte Carlo comparison of the two locators.
//!
//! The locators themselves never draw random numbers. This module produces the
//! perturbed inputs they consume: a [`SensorFrame`] for the table locator and a
//! [`RelayMeasurement`](crate::impedance::RelayMeasurement) for the impedance locator, both from the same
//! ground-truth fault.
//!
//! Each trial seeds its own `StdRng` from the master seed and the trial index,
//! so results do not depend on how rayon schedules the trials.

use crate::circuit::compute_fault_amperes;
use crate::fault_report::{FaultLog, FaultReport};
use crate::impedance::{compute_relay_measurement, locate_by_impedance, ImpedancePolicy};
use crate::reference::ReferenceTables;
use crate::table_locator::{Classification, FaultStatus, TableLocator};
use overwatch_core::{
    FaultSpec, FaultType, FeederConfig, OverwatchError, OverwatchResult, PhaseCurrents,
    SensorFrame,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Noise-free frame for a fault on a radial feeder.
///
/// Units at or upstream of the fault carry the full fault current; units
/// downstream of it read zero (load current is not modelled).
pub fn simulate_sensor_frame(config: &FeederConfig, fault: &FaultSpec) -> OverwatchResult<SensorFrame> {
    let currents = compute_fault_amperes(config, fault)?;
    let fault_km = fault.distance.value();
    Ok(config
        .unit_distances_km
        .iter()
        .map(|&unit_km| {
            if unit_km <= fault_km + 1e-9 {
                currents
            } else {
                PhaseCurrents::default()
            }
        })
        .collect())
}

/// Multiplicative uniform noise: each magnitude is scaled by `1 + relative·U(-1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NoiseModel {
    pub relative: f64,
}

impl NoiseModel {
    pub fn none() -> Self {
        Self { relative: 0.0 }
    }

    pub fn relative(fraction: f64) -> Self {
        Self { relative: fraction }
    }

    fn factor<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.relative == 0.0 {
            1.0
        } else {
            1.0 + self.relative * rng.gen_range(-1.0..=1.0)
        }
    }

    /// Perturb every phase of every unit independently.
    pub fn apply_frame<R: Rng>(&self, frame: &SensorFrame, rng: &mut R) -> SensorFrame {
        frame
            .rows()
            .iter()
            .map(|row| row.scaled([self.factor(rng), self.factor(rng), self.factor(rng)]))
            .collect()
    }
}

/// One ground-truth fault and the conditions it is observed under.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialScenario {
    pub fault: FaultSpec,
    pub noise: NoiseModel,
    pub impedance_policy: ImpedancePolicy,
}

impl TrialScenario {
    pub fn new(fault: FaultSpec) -> Self {
        Self {
            fault,
            noise: NoiseModel::none(),
            impedance_policy: ImpedancePolicy::default(),
        }
    }

    pub fn with_noise(mut self, noise: NoiseModel) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_policy(mut self, policy: ImpedancePolicy) -> Self {
        self.impedance_policy = policy;
        self
    }
}

/// Result of one noisy evaluation by both locators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub trial: usize,
    pub true_distance_km: f64,
    pub fault_type: FaultType,
    pub status: FaultStatus,
    pub classification: Option<Classification>,
    pub unit_index: Option<usize>,
    /// `None` when nothing tripped or the search zone was exhausted
    pub table_estimate_km: Option<f64>,
    pub impedance_estimate_km: f64,
    /// Field report of the table estimate, when there is one
    pub report: Option<FaultReport>,
}

impl TrialOutcome {
    pub fn table_error_km(&self) -> Option<f64> {
        self.table_estimate_km
            .map(|d| (d - self.true_distance_km).abs())
    }

    pub fn impedance_error_km(&self) -> f64 {
        (self.impedance_estimate_km - self.true_distance_km).abs()
    }

    pub fn correctly_classified(&self) -> bool {
        self.classification.and_then(Classification::fault_type) == Some(self.fault_type)
    }
}

fn trial_rng(seed: u64, trial: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Evaluate one trial with the given random source.
pub fn run_trial<R: Rng>(
    locator: &TableLocator<'_>,
    config: &FeederConfig,
    scenario: &TrialScenario,
    trial: usize,
    rng: &mut R,
) -> OverwatchResult<TrialOutcome> {
    let fault = &scenario.fault;
    let clean = simulate_sensor_frame(config, fault)?;
    let frame = scenario.noise.apply_frame(&clean, rng);

    let (status, classification, unit_index, table_result) = match locator.assess(&frame)? {
        None => (FaultStatus::NoFault, None, None, None),
        Some(assessment) => {
            let classification = Some(assessment.classified.classification);
            match locator.resolve(&assessment) {
                Ok(result) => (result.status, classification, result.unit_index, Some(result)),
                Err(OverwatchError::ZoneExhausted { unit_index, .. }) => {
                    debug!(trial, unit_index, "search zone exhausted");
                    (FaultStatus::FaultConfirmed, classification, Some(unit_index), None)
                }
                Err(err) => return Err(err),
            }
        }
    };
    let table_estimate_km = table_result.map(|r| r.distance_km);
    let report = table_result.and_then(|r| FaultReport::from_result(&r, config));

    let relay = compute_relay_measurement(config, fault, &scenario.impedance_policy)?;
    let noisy = relay.scaled(scenario.noise.factor(rng), scenario.noise.factor(rng));
    let impedance_estimate_km = locate_by_impedance(
        noisy.voltage,
        noisy.current,
        fault.fault_type,
        config,
        &scenario.impedance_policy,
    );

    Ok(TrialOutcome {
        trial,
        true_distance_km: fault.distance.value(),
        fault_type: fault.fault_type,
        status,
        classification,
        unit_index,
        table_estimate_km,
        impedance_estimate_km,
        report,
    })
}

/// Run `trials` independent noisy evaluations of one scenario.
pub fn run_trials(
    config: &FeederConfig,
    tables: &ReferenceTables,
    scenario: &TrialScenario,
    trials: usize,
    seed: u64,
) -> OverwatchResult<Vec<TrialOutcome>> {
    let locator = TableLocator::new(tables, config)?;
    info!(
        trials,
        seed,
        fault_type = %scenario.fault.fault_type,
        distance_km = scenario.fault.distance.value(),
        noise = scenario.noise.relative,
        "running Monte Carlo trials"
    );

    let one = |trial: usize| {
        let mut rng = trial_rng(seed, trial);
        run_trial(&locator, config, scenario, trial, &mut rng)
    };

    #[cfg(feature = "rayon")]
    let outcomes: OverwatchResult<Vec<TrialOutcome>> = (0..trials).into_par_iter().map(one).collect();
    #[cfg(not(feature = "rayon"))]
    let outcomes: OverwatchResult<Vec<TrialOutcome>> = (0..trials).map(one).collect();
    outcomes
}

/// Aggregate accuracy of both locators over a set of trials.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub detected: usize,
    pub located: usize,
    pub classification_accuracy: f64,
    pub table_mean_error_km: f64,
    pub table_max_error_km: f64,
    pub impedance_mean_error_km: f64,
    pub impedance_max_error_km: f64,
    /// Located trials reported as critical
    pub critical: usize,
    /// Located trials reported as warnings
    pub warning: usize,
}

pub fn summarize(outcomes: &[TrialOutcome]) -> TrialSummary {
    let trials = outcomes.len();
    if trials == 0 {
        return TrialSummary::default();
    }

    let detected = outcomes
        .iter()
        .filter(|o| o.status == FaultStatus::FaultConfirmed)
        .count();
    let correct = outcomes.iter().filter(|o| o.correctly_classified()).count();

    let table_errors: Vec<f64> = outcomes.iter().filter_map(TrialOutcome::table_error_km).collect();
    let (table_mean_error_km, table_max_error_km) = mean_and_max(&table_errors);

    let impedance_errors: Vec<f64> = outcomes.iter().map(TrialOutcome::impedance_error_km).collect();
    let (impedance_mean_error_km, impedance_max_error_km) = mean_and_max(&impedance_errors);

    let log: FaultLog = outcomes.iter().filter_map(|o| o.report).collect();
    let stats = log.stats();

    TrialSummary {
        trials,
        detected,
        located: table_errors.len(),
        classification_accuracy: correct as f64 / trials as f64,
        table_mean_error_km,
        table_max_error_km,
        impedance_mean_error_km,
        impedance_max_error_km,
        critical: stats.critical,
        warning: stats.warning,
    }
}

fn mean_and_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().copied().fold(0.0, f64::max);
    (mean, max)
}
