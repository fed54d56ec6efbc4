//! # overwatch-algo: Fault-Location Algorithms
//!
//! Locates faults on a radial distribution feeder and benchmarks the estimate
//! against a classical impedance method.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`circuit`] | Symmetrical-components fault currents for any distance and type |
//! | [`reference`] | Distance → current tables sampled from the circuit model |
//! | [`table_locator`] | Zone identification, classification and inverse lookup |
//! | [`impedance`] | Apparent-impedance distance estimate (baseline) |
//! | [`fault_report`] | Severity and field report for a located fault |
//! | [`simulation`] | Noisy sensor frames and Monte Carlo comparison |
//!
//! Tables are built once offline and shared read-only; every locate call is a
//! pure function of its inputs.
//!
//! ## Example
//!
//! ```no_run
//! use overwatch_algo::{build_default_tables, simulate_sensor_frame, TableLocator};
//! use overwatch_core::{FaultSpec, FaultType, FeederConfig};
//!
//! let config = FeederConfig::default();
//! let tables = build_default_tables(&config)?;
//! let locator = TableLocator::new(&tables, &config)?;
//!
//! let frame = simulate_sensor_frame(&config, &FaultSpec::bolted(5.0, FaultType::SingleLineToGround))?;
//! let result = locator.locate(&frame)?;
//! println!("{} at {:.2} km", result.label(), result.distance_km);
//! # Ok::<(), overwatch_core::OverwatchError>(())
//! ```

pub mod circuit;
pub mod fault_report;
pub mod impedance;
pub mod reference;
pub mod simulation;
pub mod table_locator;

pub use circuit::{compute_fault_amperes, compute_fault_currents, sequence_currents};
pub use fault_report::{FaultLog, FaultLogStats, FaultReport, Severity, CRITICAL_CURRENT_A};
pub use impedance::{
    compute_relay_measurement, locate_by_impedance, GroundLoop, ImpedancePolicy, LineLoop,
    RelayMeasurement, VoltageReference,
};
pub use reference::{
    build_default_tables, build_reference_table, build_reference_tables, ReferenceTable,
    ReferenceTables, TableRow, DEFAULT_STEP_KM,
};
pub use simulation::{
    run_trial, run_trials, simulate_sensor_frame, summarize, NoiseModel, TrialOutcome,
    TrialScenario, TrialSummary,
};
pub use table_locator::{
    classify, identify_zone, locate, Assessment, Classification, FaultStatus, LocateResult,
    TableLocator, DEFAULT_TRIP_THRESHOLD_A,
};
