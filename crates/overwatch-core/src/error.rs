//! Unified error types for the fault-location engine
//!
//! [`OverwatchError`] separates fatal preconditions (missing reference tables,
//! malformed feeder configuration) from the one search failure that callers must
//! be able to tell apart: an exhausted search zone. Detection misses and
//! ambiguous classifications are not errors; they surface in the locate result.
//!
//! # Example
//!
//! ```ignore
//! use overwatch_core::{OverwatchError, OverwatchResult};
//!
//! fn estimate(frame: &SensorFrame) -> OverwatchResult<f64> {
//!     let result = locator.locate(frame)?;
//!     Ok(result.distance_km)
//! }
//! ```

use crate::FaultType;
use thiserror::Error;

/// Unified error type for all fault-location operations.
#[derive(Error, Debug)]
pub enum OverwatchError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Feeder configuration rejected by validation
    #[error("Invalid feeder configuration: {0}")]
    InvalidConfig(String),

    /// Malformed call arguments (fault spec, table parameters, frame shape)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reference table for a fault type was never built or could not be found
    #[error("Reference table missing: {0}")]
    MissingTable(String),

    /// The zoned search left no candidate rows beyond the tripped unit
    #[error(
        "Search zone exhausted: unit {unit_index} at {min_search_km:.3} km leaves no {fault_type} table rows beyond it"
    )]
    ZoneExhausted {
        unit_index: usize,
        min_search_km: f64,
        fault_type: FaultType,
    },

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using OverwatchError.
pub type OverwatchResult<T> = Result<T, OverwatchError>;

impl OverwatchError {
    /// True for conditions that abort before any result is produced.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            OverwatchError::MissingTable(_) | OverwatchError::InvalidConfig(_)
        )
    }
}
