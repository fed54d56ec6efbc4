pub mod cli;
pub mod common;

pub use cli::{Cli, Commands, CompareArgs, FaultArgs, PolicyArgs, TableCommands};
pub use common::OutputFormat;
