use crate::common::{FaultTypeArg, GroundLoopArg, LineLoopArg, OutputFormat, VoltageArg};
use clap::{Parser, Subcommand, ValueHint};
use overwatch_algo::{DEFAULT_STEP_KM, DEFAULT_TRIP_THRESHOLD_A};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "overwatch",
    author,
    version,
    about = "Locate faults on a radial feeder from sparse current measurements",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

/// Impedance-method formula variant.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct PolicyArgs {
    /// Where the relay voltage is taken
    #[arg(long, value_enum, default_value_t = VoltageArg::Bus)]
    pub variant: VoltageArg,
    /// Loop current for ground faults
    #[arg(long, value_enum, default_value_t = GroundLoopArg::Phase)]
    pub ground_loop: GroundLoopArg,
    /// Loop current for line-to-line faults
    #[arg(long, value_enum, default_value_t = LineLoopArg::Delta)]
    pub line_loop: LineLoopArg,
}

/// The fault to simulate.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct FaultArgs {
    /// Distance from the source (km)
    #[arg(long)]
    pub distance: f64,
    #[arg(long, value_enum)]
    pub fault_type: FaultTypeArg,
    /// Fault resistance (Ω)
    #[arg(long, default_value_t = 0.0)]
    pub rf: f64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reference table management
    Table {
        #[command(subcommand)]
        command: TableCommands,
    },
    /// Locate a fault from a sensor frame and stored reference tables
    Locate {
        /// Reference table CSV produced by `table build`
        #[arg(long, value_hint = ValueHint::FilePath)]
        table: PathBuf,
        /// Sensor frame CSV (`ia,ib,ic`, one row per unit)
        #[arg(long, value_hint = ValueHint::FilePath)]
        frame: PathBuf,
        /// Feeder configuration TOML (defaults to the reference feeder)
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Peak current above which a unit counts as tripped (A)
        #[arg(long, default_value_t = DEFAULT_TRIP_THRESHOLD_A)]
        threshold: f64,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Produce the sensor frame a fault would generate
    Simulate {
        #[command(flatten)]
        fault: FaultArgs,
        /// Relative measurement noise, e.g. 0.01 for ±1%
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Write the frame as CSV
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Monte Carlo comparison of the table and impedance locators
    Compare(CompareArgs),
    /// Estimate the distance of a simulated fault with the impedance method
    Impedance {
        #[command(flatten)]
        fault: FaultArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

/// Arguments of `overwatch compare`.
#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    #[command(flatten)]
    pub fault: FaultArgs,
    #[arg(long, default_value_t = 1000)]
    pub trials: usize,
    /// Relative measurement noise, e.g. 0.01 for ±1%
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Use stored tables instead of building them
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub table: Option<PathBuf>,
    /// Table step when building (km)
    #[arg(long, default_value_t = DEFAULT_STEP_KM)]
    pub step: f64,
    #[command(flatten)]
    pub policy: PolicyArgs,
    /// Write per-trial rows as CSV
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum TableCommands {
    /// Sample the circuit model into SLG, LL and 3PH tables
    Build {
        /// Feeder configuration TOML (defaults to the reference feeder)
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
        /// Output CSV
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: PathBuf,
        /// Sampling step (km)
        #[arg(long, default_value_t = DEFAULT_STEP_KM)]
        step: f64,
        /// Table length (km); defaults to the feeder length
        #[arg(long)]
        max_length: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compare_defaults() {
        let cli = Cli::try_parse_from([
            "overwatch",
            "compare",
            "--distance",
            "3",
            "--fault-type",
            "ll",
        ])
        .unwrap();
        match cli.command {
            Commands::Compare(args) => {
                assert_eq!(args.fault.fault_type, FaultTypeArg::Ll);
                assert_eq!(args.trials, 1000);
                assert_eq!(args.noise, 0.01);
                assert_eq!(args.policy.variant, VoltageArg::Bus);
                assert!(args.table.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_three_phase_value_name() {
        let cli = Cli::try_parse_from([
            "overwatch",
            "impedance",
            "--distance",
            "4",
            "--fault-type",
            "3ph",
            "--variant",
            "source",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Impedance {
                fault: FaultArgs {
                    fault_type: FaultTypeArg::ThreePh,
                    ..
                },
                ..
            }
        ));
    }
}
