//! Argument types and helpers shared across overwatch commands.

use anyhow::Result;
use clap::ValueEnum;
use overwatch_algo::{GroundLoop, ImpedancePolicy, LineLoop, VoltageReference};
use overwatch_core::{FaultSpec, FaultType, FeederConfig};
use overwatch_io::load_feeder_config;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

use crate::cli::{FaultArgs, PolicyArgs};

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable aligned table
    #[default]
    Table,
    /// Pretty-printed JSON object
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultTypeArg {
    /// Single line-to-ground (phase A)
    Slg,
    /// Line-to-line (phases B and C)
    Ll,
    /// Balanced three-phase
    #[value(name = "3ph")]
    ThreePh,
}

impl From<FaultTypeArg> for FaultType {
    fn from(arg: FaultTypeArg) -> Self {
        match arg {
            FaultTypeArg::Slg => FaultType::SingleLineToGround,
            FaultTypeArg::Ll => FaultType::LineToLine,
            FaultTypeArg::ThreePh => FaultType::ThreePhase,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoltageArg {
    /// Substation bus voltage
    Bus,
    /// Source EMF, source impedance subtracted
    Source,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundLoopArg {
    /// Phase A current, characteristic (2·z1 + z0) / 3
    Phase,
    /// Zero-sequence current, characteristic 2·z1 + z0
    Zero,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineLoopArg {
    /// Ib − Ic, characteristic z1
    Delta,
    /// Ib alone, characteristic 2·z1
    Phase,
}

impl PolicyArgs {
    pub fn to_policy(self) -> ImpedancePolicy {
        ImpedancePolicy {
            voltage_reference: match self.variant {
                VoltageArg::Bus => VoltageReference::Bus,
                VoltageArg::Source => VoltageReference::SourceEmf,
            },
            ground_loop: match self.ground_loop {
                GroundLoopArg::Phase => GroundLoop::PhaseCurrent,
                GroundLoopArg::Zero => GroundLoop::ZeroSequenceCurrent,
            },
            line_loop: match self.line_loop {
                LineLoopArg::Delta => LineLoop::DeltaCurrent,
                LineLoopArg::Phase => LineLoop::PhaseCurrent,
            },
        }
    }
}

impl FaultArgs {
    pub fn to_spec(self) -> FaultSpec {
        FaultSpec::bolted(self.distance, self.fault_type.into()).with_resistance(self.rf)
    }
}

/// Feeder from `path`, or the reference feeder when none is given.
pub fn feeder_config(path: Option<&Path>) -> Result<FeederConfig> {
    match path {
        Some(path) => load_feeder_config(path),
        None => {
            debug!("no --config given; using the reference feeder");
            let config = FeederConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Write a value as pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
