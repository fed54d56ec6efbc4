//! # overwatch-core: Feeder Fault-Location Data Model
//!
//! Shared types for estimating the distance to a fault on a radial distribution
//! feeder from a handful of current measurements.
//!
//! ## Design Philosophy
//!
//! The engine is a set of pure functions over immutable inputs:
//! - [`FeederConfig`] describes the feeder (bases, impedances, unit placement)
//!   and is passed explicitly to every call. There is no process-wide state.
//! - [`FaultSpec`] describes one fault to evaluate.
//! - [`SensorFrame`] is one measurement snapshot, one row per monitoring unit.
//!
//! Complex per-unit phasors ([`PhasePhasors`]) and ampere magnitudes
//! ([`PhaseCurrents`]) are separate types; see [`phase`] for the conversion
//! boundary.
//!
//! ## Quick Start
//!
//! ```rust
//! use overwatch_core::*;
//!
//! let config = FeederConfig::default();
//! config.validate()?;
//!
//! let fault = FaultSpec::bolted(5.0, FaultType::SingleLineToGround);
//! assert!(fault.distance.value() <= config.length.value());
//! # Ok::<(), OverwatchError>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`] - [`OverwatchError`] and the result alias
//! - [`feeder`] - feeder configuration and validation
//! - [`fault`] - fault types and fault specifications
//! - [`phase`] - phase currents, phasors and sensor frames
//! - [`units`] - unit newtypes (km, A, Ω, kV, MVA)

pub mod error;
pub mod fault;
pub mod feeder;
pub mod phase;
pub mod units;

pub use error::{OverwatchError, OverwatchResult};
pub use fault::{FaultSpec, FaultType};
pub use feeder::FeederConfig;
pub use num_complex::Complex64;
pub use phase::{Phase, PhaseCurrents, PhasePhasors, SensorFrame};
pub use units::{Amperes, Kilometers, Kilovolts, MegavoltAmperes, Ohms};
